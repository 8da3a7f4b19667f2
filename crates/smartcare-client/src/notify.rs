//! User-facing notifications.
//!
//! Every mutation outcome produces exactly one [`Notification`], delivered
//! through a [`Notifier`] injected into the client. Text is chosen by the
//! session user's preferred language.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Display language for notification text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ko,
    En,
}

impl Language {
    /// Resolve a language tag such as `ko`, `en` or `en-US`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next().unwrap_or("");
        match primary.to_ascii_lowercase().as_str() {
            "ko" => Some(Self::Ko),
            "en" => Some(Self::En),
            _ => None,
        }
    }
}

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub variant: Variant,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: title.into(),
            description,
            variant: Variant::Default,
        }
    }

    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            variant: Variant::Destructive,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.variant == Variant::Destructive
    }
}

/// Side channel that surfaces notifications to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        let description = n.description.as_deref().unwrap_or("");
        match n.variant {
            Variant::Default => tracing::info!(title = %n.title, description, "notification"),
            Variant::Destructive => tracing::warn!(title = %n.title, description, "notification"),
        }
    }
}

/// Forwards notifications to a channel consumed by the front end.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            tracing::debug!("notification receiver dropped");
        }
    }
}

// =============================================================================
// Message catalog
// =============================================================================

/// Which mutation a notification reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// Localized noun for a resource collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Noun {
    pub ko: &'static str,
    pub en: &'static str,
}

impl Noun {
    fn get(&self, lang: Language) -> &'static str {
        match lang {
            Language::Ko => self.ko,
            Language::En => self.en,
        }
    }
}

/// Notification for a successful mutation. `label` is the record's display
/// name when it has one.
pub fn mutation_succeeded(
    lang: Language,
    kind: MutationKind,
    noun: Noun,
    label: Option<&str>,
) -> Notification {
    let n = noun.get(lang);
    let (title, description) = match (lang, kind) {
        (Language::Ko, MutationKind::Create) => (
            format!("{n} 등록 성공"),
            match label {
                Some(l) => format!("{l}이(가) 등록되었습니다."),
                None => format!("{n}이(가) 등록되었습니다."),
            },
        ),
        (Language::Ko, MutationKind::Update) => (
            format!("{n} 정보 업데이트 성공"),
            match label {
                Some(l) => format!("{l}의 정보가 수정되었습니다."),
                None => format!("{n} 정보가 수정되었습니다."),
            },
        ),
        (Language::Ko, MutationKind::Delete) => {
            (format!("{n} 삭제 성공"), format!("{n}이(가) 삭제되었습니다."))
        }
        (Language::En, MutationKind::Create) => (
            format!("{} created", capitalize(n)),
            format!("{} was created.", label.unwrap_or(n)),
        ),
        (Language::En, MutationKind::Update) => (
            format!("{} updated", capitalize(n)),
            format!("{} was updated.", label.unwrap_or(n)),
        ),
        (Language::En, MutationKind::Delete) => (
            format!("{} deleted", capitalize(n)),
            format!("The {n} was deleted."),
        ),
    };
    Notification::success(title, Some(description))
}

/// Notification for a failed mutation, carrying the server's message.
pub fn mutation_failed(
    lang: Language,
    kind: MutationKind,
    noun: Noun,
    message: &str,
) -> Notification {
    let n = noun.get(lang);
    let title = match (lang, kind) {
        (Language::Ko, MutationKind::Create) => format!("{n} 등록 실패"),
        (Language::Ko, MutationKind::Update) => format!("{n} 정보 업데이트 실패"),
        (Language::Ko, MutationKind::Delete) => format!("{n} 삭제 실패"),
        (Language::En, MutationKind::Create) => format!("Failed to create {n}"),
        (Language::En, MutationKind::Update) => format!("Failed to update {n}"),
        (Language::En, MutationKind::Delete) => format!("Failed to delete {n}"),
    };
    Notification::failure(title, message)
}

pub(crate) fn login_succeeded(lang: Language, name: &str) -> Notification {
    match lang {
        Language::Ko => Notification::success("로그인 성공", Some(format!("{name}님 환영합니다!"))),
        Language::En => Notification::success("Signed in", Some(format!("Welcome, {name}!"))),
    }
}

pub(crate) fn login_failed(lang: Language, invalid_credentials: bool, message: &str) -> Notification {
    match (lang, invalid_credentials) {
        (Language::Ko, true) => {
            Notification::failure("로그인 실패", "아이디 또는 비밀번호가 올바르지 않습니다")
        }
        (Language::Ko, false) => Notification::failure("로그인 실패", message),
        (Language::En, true) => Notification::failure("Sign-in failed", "Invalid username or password"),
        (Language::En, false) => Notification::failure("Sign-in failed", message),
    }
}

pub(crate) fn register_succeeded(lang: Language) -> Notification {
    match lang {
        Language::Ko => {
            Notification::success("회원가입 성공", Some("계정이 성공적으로 생성되었습니다.".into()))
        }
        Language::En => {
            Notification::success("Account created", Some("Your account was created.".into()))
        }
    }
}

pub(crate) fn register_failed(lang: Language, message: &str) -> Notification {
    match lang {
        Language::Ko => Notification::failure("회원가입 실패", message),
        Language::En => Notification::failure("Registration failed", message),
    }
}

pub(crate) fn logout_succeeded(lang: Language) -> Notification {
    match lang {
        Language::Ko => Notification::success("로그아웃 되었습니다", None),
        Language::En => Notification::success("Signed out", None),
    }
}

pub(crate) fn logout_failed(lang: Language, message: &str) -> Notification {
    match lang {
        Language::Ko => Notification::failure("로그아웃 실패", message),
        Language::En => Notification::failure("Sign-out failed", message),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
