//! crates/scrible_core/src/repository.rs
//!
//! Notebook operations on top of the record store. Every operation reads the
//! whole collection, and every mutation writes the whole collection back.

use chrono::{DateTime, Duration, Local, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::domain::{NewNotebook, Notebook, NotebookPatch};
use crate::ids::draw_unused_id;
use crate::ports::{Clock, IdGenerator, PortError, PortResult, SlotStorage};
use crate::store::{RecordStore, NOTEBOOKS_SLOT};

/// Format of the stamp embedded in an append separator, e.g. `10/18/2026, 3:04:05 PM`.
const APPEND_STAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

pub struct NotebookRepository {
    records: RecordStore<Notebook>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    /// Held for the duration of each read-modify-write cycle.
    cycle: Mutex<()>,
}

impl NotebookRepository {
    pub fn new(
        storage: Arc<dyn SlotStorage>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            records: RecordStore::new(storage, NOTEBOOKS_SLOT),
            clock,
            ids,
            cycle: Mutex::new(()),
        }
    }

    fn lock(&self) -> PortResult<MutexGuard<'_, ()>> {
        self.cycle
            .lock()
            .map_err(|_| PortError::Unexpected("notebook repository mutex poisoned".to_string()))
    }

    /// A timestamp strictly later than `previous`, even if the clock disagrees.
    fn next_timestamp(&self, previous: DateTime<Utc>) -> DateTime<Utc> {
        let now = self.clock.now();
        if now > previous {
            now
        } else {
            previous + Duration::microseconds(1)
        }
    }

    fn fresh_id(&self, existing: &[Notebook]) -> PortResult<String> {
        draw_unused_id(self.ids.as_ref(), |candidate| {
            existing.iter().any(|n| n.id == candidate)
        })
    }

    /// Saves a new notebook at the end of the collection.
    pub fn create(&self, user_id: &str, new: NewNotebook) -> PortResult<Notebook> {
        let _cycle = self.lock()?;
        let mut notebooks = self.records.read_all()?;

        let id = self.fresh_id(&notebooks)?;
        let now = self.clock.now();
        let notebook = Notebook {
            id,
            user_id: user_id.to_string(),
            title: new.title,
            text: new.text,
            paper_style: new.paper_style,
            font_style: new.font_style,
            created_at: now,
            updated_at: now,
        };

        notebooks.push(notebook.clone());
        self.records.write_all(&notebooks)?;
        info!("Created notebook {} for user {}", notebook.id, user_id);
        Ok(notebook)
    }

    /// Every stored notebook regardless of owner, in stored order.
    pub fn list_all(&self) -> PortResult<Vec<Notebook>> {
        self.records.read_all()
    }

    /// The notebooks owned by `user_id`, in stored order.
    pub fn list_by_owner(&self, user_id: &str) -> PortResult<Vec<Notebook>> {
        let notebooks = self.records.read_all()?;
        Ok(notebooks
            .into_iter()
            .filter(|n| n.user_id == user_id)
            .collect())
    }

    pub fn get_by_id(&self, id: &str, user_id: &str) -> PortResult<Option<Notebook>> {
        let notebooks = self.records.read_all()?;
        Ok(notebooks
            .into_iter()
            .find(|n| n.id == id && n.user_id == user_id))
    }

    /// Merges `patch` into the notebook owned by `user_id`.
    ///
    /// Returns `None` without writing when no such notebook exists.
    pub fn update(
        &self,
        id: &str,
        user_id: &str,
        patch: NotebookPatch,
    ) -> PortResult<Option<Notebook>> {
        let _cycle = self.lock()?;
        let mut notebooks = self.records.read_all()?;
        let Some(index) = position(&notebooks, id, user_id) else {
            return Ok(None);
        };

        let now = self.next_timestamp(notebooks[index].updated_at);
        self.apply_patch(&mut notebooks, index, patch, now).map(Some)
    }

    /// Removes the notebook owned by `user_id`. Always succeeds; deleting a
    /// missing notebook, or someone else's, changes nothing.
    pub fn delete(&self, id: &str, user_id: &str) -> PortResult<bool> {
        let _cycle = self.lock()?;
        let mut notebooks = self.records.read_all()?;
        let before = notebooks.len();
        notebooks.retain(|n| !(n.id == id && n.user_id == user_id));

        if notebooks.len() != before {
            self.records.write_all(&notebooks)?;
            info!("Deleted notebook {} for user {}", id, user_id);
        } else {
            debug!("Delete of notebook {} for user {} matched nothing", id, user_id);
        }
        Ok(true)
    }

    /// Appends freshly extracted text below a stamped separator.
    ///
    /// Blank input returns the notebook untouched. A notebook with blank text
    /// simply takes the new text.
    pub fn append_text(
        &self,
        id: &str,
        user_id: &str,
        new_text: &str,
    ) -> PortResult<Option<Notebook>> {
        let _cycle = self.lock()?;
        let mut notebooks = self.records.read_all()?;
        let Some(index) = position(&notebooks, id, user_id) else {
            return Ok(None);
        };

        let cleaned = new_text.trim();
        if cleaned.is_empty() {
            debug!("Ignoring blank append to notebook {}", id);
            return Ok(Some(notebooks[index].clone()));
        }

        let existing = &notebooks[index];
        let now = self.next_timestamp(existing.updated_at);
        let next_text = if existing.text.trim().is_empty() {
            cleaned.to_string()
        } else {
            format!("{}{}{}", existing.text, append_separator(now), cleaned)
        };

        self.apply_patch(&mut notebooks, index, NotebookPatch::text(next_text), now)
            .map(Some)
    }

    fn apply_patch(
        &self,
        notebooks: &mut [Notebook],
        index: usize,
        patch: NotebookPatch,
        now: DateTime<Utc>,
    ) -> PortResult<Notebook> {
        let notebook = &mut notebooks[index];
        patch.apply_to(notebook);
        notebook.updated_at = now;
        let updated = notebook.clone();

        self.records.write_all(notebooks)?;
        info!("Updated notebook {} for user {}", updated.id, updated.user_id);
        Ok(updated)
    }
}

fn position(notebooks: &[Notebook], id: &str, user_id: &str) -> Option<usize> {
    notebooks
        .iter()
        .position(|n| n.id == id && n.user_id == user_id)
}

/// `\n\n---\n[Appended <local date/time>]\n\n`
pub fn append_separator(at: DateTime<Utc>) -> String {
    let stamp = at.with_timezone(&Local).format(APPEND_STAMP_FORMAT);
    format!("\n\n---\n[Appended {}]\n\n", stamp)
}
