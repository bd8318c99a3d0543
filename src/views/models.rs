//! Model Manager view: list, create and delete model configurations.
//!
//! Every successful write is followed by a full re-fetch instead of a local
//! patch. There is no edit path.
use std::rc::Rc;

use crate::store::{
    Collection, ListQuery, Model, ModelParameters, ModelType, NewModel, RecordStore,
    RecordStoreExt,
};

/// Contents of the "Create New Model" form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelDraft {
    pub name: String,
    pub description: String,
    pub model_type: ModelType,
}

pub struct ModelManager {
    store: Rc<dyn RecordStore>,
    owner: String,
    models: Vec<Model>,
    creating: bool,
    draft: ModelDraft,
}

impl ModelManager {
    /// Build the view and load the owner's models, newest first.
    pub fn mount(store: Rc<dyn RecordStore>, owner: impl Into<String>) -> Self {
        let mut view = Self {
            store,
            owner: owner.into(),
            models: Vec::new(),
            creating: false,
            draft: ModelDraft::default(),
        };
        view.refresh();
        view
    }

    /// Re-fetch the list. A failed read leaves the list empty.
    pub fn refresh(&mut self) {
        let query = ListQuery::owned_by(&self.owner).newest_first("created_at");
        self.models = self
            .store
            .list(Collection::Models, &query)
            .unwrap_or_default();
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn is_creating(&self) -> bool {
        self.creating
    }

    /// True when the "No models yet" placeholder should show.
    pub fn shows_empty_state(&self) -> bool {
        self.models.is_empty() && !self.creating
    }

    pub fn open_form(&mut self) {
        self.creating = true;
    }

    /// Close the form. The draft is kept, as the form would keep its inputs.
    pub fn cancel_form(&mut self) {
        self.creating = false;
    }

    pub fn draft(&self) -> &ModelDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ModelDraft {
        &mut self.draft
    }

    /// Submit the draft with the default parameters.
    ///
    /// Returns `true` when the model was created; the draft is then reset,
    /// the form closed and the list re-fetched. An empty name or a failed
    /// insert changes nothing.
    pub fn create(&mut self) -> bool {
        if self.draft.name.is_empty() {
            return false;
        }

        let new_model = NewModel {
            user_id: self.owner.clone(),
            name: self.draft.name.clone(),
            description: self.draft.description.clone(),
            model_type: self.draft.model_type,
            parameters: ModelParameters::default(),
        };

        if self
            .store
            .insert_record::<Model, _>(Collection::Models, &new_model)
            .is_err()
        {
            return false;
        }

        self.draft = ModelDraft::default();
        self.creating = false;
        self.refresh();
        true
    }

    /// Delete a model once `confirm` agrees, then re-fetch.
    ///
    /// Returns whether a delete was issued and succeeded.
    pub fn delete(&mut self, id: &str, confirm: impl FnOnce(&str) -> bool) -> bool {
        if !confirm(id) {
            return false;
        }

        let deleted = self.store.delete(Collection::Models, id).is_ok();
        self.refresh();
        deleted
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;

    fn manager() -> (Rc<LocalStore>, ModelManager) {
        let store = Rc::new(LocalStore::new());
        let view = ModelManager::mount(store.clone(), "u1");
        (store, view)
    }

    #[test]
    fn mount_on_empty_store_shows_placeholder() {
        let (_, view) = manager();
        assert!(view.models().is_empty());
        assert!(view.shows_empty_state());
    }

    #[test]
    fn create_requires_a_name() {
        let (store, mut view) = manager();
        view.open_form();
        view.draft_mut().description = "no name".to_string();
        assert!(!view.create());
        assert!(view.is_creating());
        assert_eq!(store.row_count(Collection::Models), 0);
    }

    #[test]
    fn create_stores_default_parameters_and_closes_form() {
        let (_, mut view) = manager();
        view.open_form();
        view.draft_mut().name = "Summarizer".to_string();
        view.draft_mut().model_type = ModelType::TextGeneration;

        assert!(view.create());
        assert!(!view.is_creating());
        assert_eq!(view.draft(), &ModelDraft::default());
        assert_eq!(view.models().len(), 1);

        let params = &view.models()[0].parameters;
        assert_eq!(params["temperature"], 0.7);
        assert_eq!(params["max_tokens"], 1000);
        assert_eq!(params["top_p"], 1.0);
    }

    #[test]
    fn failed_insert_keeps_form_open() {
        let (store, mut view) = manager();
        view.open_form();
        view.draft_mut().name = "Offline".to_string();
        store.set_offline(true);

        assert!(!view.create());
        assert!(view.is_creating());
        assert_eq!(view.draft().name, "Offline");
    }

    #[test]
    fn declined_confirmation_deletes_nothing() {
        let (_, mut view) = manager();
        view.draft_mut().name = "Keep".to_string();
        view.create();
        let id = view.models()[0].id.clone();

        assert!(!view.delete(&id, |_| false));
        assert_eq!(view.models().len(), 1);
    }

    #[test]
    fn cancel_hides_form_and_keeps_draft() {
        let (_, mut view) = manager();
        view.open_form();
        view.draft_mut().name = "half typed".to_string();
        view.cancel_form();
        assert!(!view.is_creating());
        assert_eq!(view.draft().name, "half typed");
    }
}
