/// Integration tests for the Model Manager view against the in-process store.
use std::rc::Rc;

use aidash::store::{Collection, ListQuery, LocalStore, ModelType, RecordStore};
use aidash::views::ModelManager;
use serde_json::json;

fn create(view: &mut ModelManager, name: &str, model_type: ModelType) {
    view.open_form();
    view.draft_mut().name = name.to_string();
    view.draft_mut().model_type = model_type;
    assert!(view.create(), "creating {name} should succeed");
}

#[test]
fn delete_removes_exactly_that_model() {
    let store = Rc::new(LocalStore::new());
    store
        .insert(
            Collection::Models,
            json!({ "user_id": "someone-else", "name": "Theirs", "model_type": "classification" }),
        )
        .unwrap();

    let mut view = ModelManager::mount(store.clone(), "u1");
    create(&mut view, "Alpha", ModelType::TextGeneration);
    create(&mut view, "Beta", ModelType::ImageAnalysis);
    create(&mut view, "Gamma", ModelType::SentimentAnalysis);

    let target = view
        .models()
        .iter()
        .find(|m| m.name == "Beta")
        .unwrap()
        .id
        .clone();
    assert!(view.delete(&target, |id| id == target));

    let names: Vec<&str> = view.models().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Gamma", "Alpha"]);
    assert!(view.models().iter().all(|m| m.id != target));
    assert_eq!(store.row_count(Collection::Models), 3);

    let theirs = store
        .select(Collection::Models, &ListQuery::owned_by("someone-else"))
        .unwrap();
    assert_eq!(theirs.len(), 1);
}

#[test]
fn list_is_newest_first_and_owner_scoped() {
    let store = Rc::new(LocalStore::new());
    store.seed_demo("u2", "other@example.com").unwrap();

    let mut view = ModelManager::mount(store.clone(), "u1");
    assert!(view.shows_empty_state());

    create(&mut view, "Older", ModelType::Classification);
    create(&mut view, "Newer", ModelType::Classification);

    assert_eq!(view.models().len(), 2);
    assert_eq!(view.models()[0].name, "Newer");
    assert_eq!(view.models()[1].name, "Older");
    assert!(!view.shows_empty_state());
}

#[test]
fn created_model_carries_type_and_description() {
    let store = Rc::new(LocalStore::new());
    let mut view = ModelManager::mount(store, "u1");

    view.open_form();
    view.draft_mut().name = "Mood".to_string();
    view.draft_mut().description = "Reads the room".to_string();
    view.draft_mut().model_type = ModelType::SentimentAnalysis;
    assert!(view.create());

    let model = &view.models()[0];
    assert_eq!(model.model_type, ModelType::SentimentAnalysis);
    assert_eq!(model.model_type.label(), "SENTIMENT ANALYSIS");
    assert_eq!(model.description, "Reads the room");
    assert_eq!(model.user_id, "u1");
}

#[test]
fn failed_delete_still_refetches() {
    let store = Rc::new(LocalStore::new());
    let mut view = ModelManager::mount(store.clone(), "u1");
    create(&mut view, "Solo", ModelType::TextGeneration);
    let id = view.models()[0].id.clone();

    store.set_offline(true);
    assert!(!view.delete(&id, |_| true));
    assert!(view.models().is_empty());

    store.set_offline(false);
    view.refresh();
    assert_eq!(view.models().len(), 1);
}
