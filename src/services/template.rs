//! Template service
//!
//! Reusable presets for quick expense entry, kept in a user-defined order.

use std::collections::HashSet;

use chrono::Utc;

use crate::error::{SpendError, SpendResult};
use crate::models::{Template, TemplateId, TemplateInput, TemplateUpdate};
use crate::storage::{StorageAdapter, StorageKey};

/// Service for template management
pub struct TemplateService<'a> {
    storage: &'a StorageAdapter,
}

impl<'a> TemplateService<'a> {
    /// Create a new template service
    pub fn new(storage: &'a StorageAdapter) -> Self {
        Self { storage }
    }

    fn load(&self) -> SpendResult<Vec<Template>> {
        Ok(self
            .storage
            .get::<Vec<Template>>(StorageKey::Templates)?
            .unwrap_or_default())
    }

    fn save(&self, templates: &[Template]) -> SpendResult<()> {
        self.storage.set(StorageKey::Templates, templates)?;
        Ok(())
    }

    /// Create a new template at the end of the list
    pub fn create(&self, input: TemplateInput) -> SpendResult<Template> {
        input.validate()?;

        let mut templates = self.load()?;
        let sort_order = templates
            .iter()
            .map(|t| t.sort_order)
            .max()
            .map_or(0, |max| max + 1);

        let template = Template::from_input(input, sort_order);
        templates.push(template.clone());
        self.save(&templates)?;

        tracing::debug!(id = %template.id, name = %template.name, sort_order, "template created");
        Ok(template)
    }

    /// Apply a partial update to a template
    pub fn update(&self, id: TemplateId, update: &TemplateUpdate) -> SpendResult<Template> {
        let mut templates = self.load()?;
        let index = templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| SpendError::template_not_found(id.to_string()))?;

        let updated = templates[index].merged(update)?;
        templates[index] = updated.clone();
        self.save(&templates)?;

        tracing::debug!(id = %id, "template updated");
        Ok(updated)
    }

    /// Delete a template, returning the removed record
    ///
    /// Remaining templates keep their sort orders, so gaps may appear until
    /// the next reorder.
    pub fn delete(&self, id: TemplateId) -> SpendResult<Template> {
        let mut templates = self.load()?;
        let index = templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| SpendError::template_not_found(id.to_string()))?;

        let removed = templates.remove(index);
        self.save(&templates)?;

        tracing::debug!(id = %id, "template deleted");
        Ok(removed)
    }

    /// Get a template by ID
    pub fn get_by_id(&self, id: TemplateId) -> SpendResult<Template> {
        self.load()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| SpendError::template_not_found(id.to_string()))
    }

    /// All templates in ascending sort order
    pub fn list(&self) -> SpendResult<Vec<Template>> {
        let mut templates = self.load()?;
        templates.sort_by_key(|t| t.sort_order);
        Ok(templates)
    }

    /// Reassign sort orders so `ordered_ids[i]` gets position `i`
    ///
    /// `ordered_ids` must name every template exactly once. Nothing is written
    /// unless the whole list is accepted.
    pub fn reorder(&self, ordered_ids: &[TemplateId]) -> SpendResult<Vec<Template>> {
        let mut templates = self.load()?;

        if let Some(missing) = ordered_ids
            .iter()
            .find(|id| !templates.iter().any(|t| t.id == **id))
        {
            return Err(SpendError::template_not_found(missing.to_string()));
        }

        if ordered_ids.len() != templates.len() {
            return Err(SpendError::validation(
                "ordered_ids",
                format!(
                    "expected {} template IDs, got {}",
                    templates.len(),
                    ordered_ids.len()
                ),
            ));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = ordered_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(SpendError::validation(
                "ordered_ids",
                format!("template {} listed more than once", dup),
            ));
        }

        let now = Utc::now();
        for (position, id) in ordered_ids.iter().enumerate() {
            if let Some(template) = templates.iter_mut().find(|t| t.id == *id) {
                template.sort_order = position as u32;
                template.updated_at = now;
            }
        }
        templates.sort_by_key(|t| t.sort_order);
        self.save(&templates)?;

        tracing::debug!(count = templates.len(), "templates reordered");
        Ok(templates)
    }
}
