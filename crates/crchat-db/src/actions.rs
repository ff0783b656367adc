use crchat_types::models::{Action, NewAction};

use crate::document::{Backend, Document, check_sequence};
use crate::error::Result;

/// Append-only log of every write that passed authorization.
pub struct Actions {
    doc: Document<Vec<Action>>,
}

impl Actions {
    pub fn open(backend: impl Backend + 'static) -> Result<Self> {
        Ok(Self {
            doc: Document::open(backend, Vec::new())?,
        })
    }

    /// Append `item` as the next action and return the stored record.
    pub fn add(&self, item: &NewAction) -> Result<Action> {
        let resource = self.doc.name().to_string();
        self.doc.transact(|actions| {
            check_sequence(&resource, actions)?;
            let action = item.to_action(actions.len() as u64);
            actions.push(action.clone());
            Ok(action)
        })
    }

    pub fn get(&self) -> Result<Vec<Action>> {
        self.doc.load()
    }

    pub fn get_serialized(&self) -> Result<String> {
        self.doc.load_raw()
    }

    pub fn size(&self) -> Result<usize> {
        Ok(self.doc.load()?.len())
    }
}
