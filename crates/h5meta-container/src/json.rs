use std::fs;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ContainerError, ContainerResult};
use crate::memory::TreeContainer;
use crate::traits::{Container, ContainerReader};
use crate::tree::ContainerTree;

/// Reads containers described as JSON [`ContainerTree`] documents.
///
/// The whole description is parsed on open; the returned handle holds no
/// file descriptor.
#[derive(Clone, Debug, Default)]
pub struct JsonContainerReader;

impl JsonContainerReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse a container description from a string.
    pub fn parse(source: &str, text: &str) -> ContainerResult<TreeContainer> {
        let tree: ContainerTree = serde_json::from_str(text)
            .map_err(|e| ContainerError::Parse(format!("{source}: {e}")))?;
        Ok(TreeContainer::new(source, Arc::new(tree)))
    }
}

impl ContainerReader for JsonContainerReader {
    fn open(&self, path: &str) -> ContainerResult<Box<dyn Container>> {
        let text = fs::read_to_string(path)?;
        let container = Self::parse(path, &text)?;
        debug!(path, bytes = text.len(), "opened JSON container");
        Ok(Box::new(container))
    }
}
