//! Dashboard Shell: tab navigation, greeting and the settings panel.
//!
//! Exactly one view is mounted at a time. Selecting a tab drops the previous
//! view and mounts a fresh one, so every tab switch re-fetches.
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use super::chat::ChatView;
use super::models::ModelManager;
use super::predictions::PredictionHistory;
use crate::auth::Session;
use crate::completion::CompletionClient;
use crate::store::{Profile, RecordStore, RecordStoreExt};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Models,
    Chat,
    Predictions,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Self::Models, Self::Chat, Self::Predictions, Self::Settings];

    pub fn id(self) -> &'static str {
        match self {
            Self::Models => "models",
            Self::Chat => "chat",
            Self::Predictions => "predictions",
            Self::Settings => "settings",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Models => "AI Models",
            Self::Chat => "AI Chat",
            Self::Predictions => "Predictions",
            Self::Settings => "Settings",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Static account details shown under Settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsPanel {
    pub email: String,
    pub full_name: String,
}

/// The one mounted view.
pub enum ActiveView {
    Models(ModelManager),
    Chat(ChatView),
    Predictions(PredictionHistory),
    Settings,
}

impl ActiveView {
    pub fn tab(&self) -> Tab {
        match self {
            Self::Models(_) => Tab::Models,
            Self::Chat(_) => Tab::Chat,
            Self::Predictions(_) => Tab::Predictions,
            Self::Settings => Tab::Settings,
        }
    }
}

pub struct Dashboard {
    session: Session,
    store: Rc<dyn RecordStore>,
    completion: Rc<dyn CompletionClient>,
    profile: Option<Profile>,
    view: ActiveView,
}

impl Dashboard {
    /// Fetch the profile once and mount the default tab.
    pub fn mount(
        session: Session,
        store: Rc<dyn RecordStore>,
        completion: Rc<dyn CompletionClient>,
    ) -> Self {
        let profile = store.fetch_profile(&session.user.id).ok().flatten();
        let view = ActiveView::Models(ModelManager::mount(store.clone(), &session.user.id));
        Self {
            session,
            store,
            completion,
            profile,
            view,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn tab(&self) -> Tab {
        self.view.tab()
    }

    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    /// Tear down the current view and mount `tab`.
    pub fn select_tab(&mut self, tab: Tab) {
        let owner = self.session.user.id.clone();
        self.view = match tab {
            Tab::Models => ActiveView::Models(ModelManager::mount(self.store.clone(), owner)),
            Tab::Chat => ActiveView::Chat(ChatView::mount(
                self.store.clone(),
                self.completion.clone(),
                owner,
            )),
            Tab::Predictions => {
                ActiveView::Predictions(PredictionHistory::mount(self.store.clone(), &owner))
            }
            Tab::Settings => ActiveView::Settings,
        };
    }

    /// `Welcome, {full name or email}`.
    pub fn greeting(&self) -> String {
        let name = self
            .profile
            .as_ref()
            .and_then(|p| p.full_name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(self.session.user.email.as_str());
        format!("Welcome, {name}")
    }

    pub fn settings(&self) -> SettingsPanel {
        SettingsPanel {
            email: self.session.user.email.clone(),
            full_name: self
                .profile
                .as_ref()
                .and_then(|p| p.full_name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Not set".to_string()),
        }
    }

    /// The Model Manager, mounted fresh if another tab was showing.
    pub fn models(&mut self) -> &mut ModelManager {
        if !matches!(self.view, ActiveView::Models(_)) {
            self.select_tab(Tab::Models);
        }
        let ActiveView::Models(view) = &mut self.view else {
            unreachable!("models tab was just mounted")
        };
        view
    }

    /// The Chat view, mounted fresh if another tab was showing.
    pub fn chat(&mut self) -> &mut ChatView {
        if !matches!(self.view, ActiveView::Chat(_)) {
            self.select_tab(Tab::Chat);
        }
        let ActiveView::Chat(view) = &mut self.view else {
            unreachable!("chat tab was just mounted")
        };
        view
    }

    /// The Prediction History, mounted fresh if another tab was showing.
    pub fn predictions(&mut self) -> &mut PredictionHistory {
        if !matches!(self.view, ActiveView::Predictions(_)) {
            self.select_tab(Tab::Predictions);
        }
        let ActiveView::Predictions(view) = &mut self.view else {
            unreachable!("predictions tab was just mounted")
        };
        view
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;
    use crate::auth::User;
    use crate::store::{LocalStore, Message};

    struct Silent;

    impl CompletionClient for Silent {
        fn complete(&self, _message: &str, _history: &[Message]) -> Result<Option<String>> {
            Ok(None)
        }
    }

    fn session(email: &str) -> Session {
        Session {
            access_token: String::new(),
            user: User {
                id: "u1".to_string(),
                email: email.to_string(),
            },
        }
    }

    fn dashboard(store: Rc<LocalStore>) -> Dashboard {
        Dashboard::mount(session("ada@example.com"), store, Rc::new(Silent))
    }

    #[test]
    fn tab_ids_round_trip() {
        for tab in Tab::ALL {
            assert_eq!(Tab::parse(tab.id()), Some(tab));
        }
        assert_eq!(Tab::parse("billing"), None);
        assert_eq!(Tab::default(), Tab::Models);
    }

    #[test]
    fn mount_defaults_to_models() {
        let store = Rc::new(LocalStore::new());
        store.seed_demo("u1", "ada@example.com").unwrap();
        let mut dash = dashboard(store);
        assert_eq!(dash.tab(), Tab::Models);
        assert_eq!(dash.models().models().len(), 3);
    }

    #[test]
    fn greeting_prefers_full_name() {
        let store = Rc::new(LocalStore::new());
        store
            .insert(
                crate::store::Collection::Profiles,
                serde_json::json!({ "id": "u1", "email": "ada@example.com", "full_name": "Ada Lovelace" }),
            )
            .unwrap();
        let dash = dashboard(store);
        assert_eq!(dash.greeting(), "Welcome, Ada Lovelace");
        assert_eq!(dash.settings().full_name, "Ada Lovelace");
    }

    #[test]
    fn missing_profile_falls_back_to_email() {
        let dash = dashboard(Rc::new(LocalStore::new()));
        assert!(dash.profile().is_none());
        assert_eq!(dash.greeting(), "Welcome, ada@example.com");
        assert_eq!(
            dash.settings(),
            SettingsPanel {
                email: "ada@example.com".to_string(),
                full_name: "Not set".to_string(),
            }
        );
    }

    #[test]
    fn switching_tabs_remounts() {
        let store = Rc::new(LocalStore::new());
        let mut dash = dashboard(store.clone());

        dash.chat().new_conversation();
        assert_eq!(dash.tab(), Tab::Chat);
        assert_eq!(dash.chat().conversations().len(), 1);

        dash.select_tab(Tab::Settings);
        assert_eq!(dash.tab(), Tab::Settings);

        // A fresh mount picks up the stored conversation as active.
        assert!(dash.chat().active().is_some());
        assert_eq!(dash.predictions().stats().total, 0);
        assert_eq!(dash.tab(), Tab::Predictions);
    }
}
