#![forbid(unsafe_code)]

//! Locale providers for date interpretation and formatting.
//!
//! Controls never look up a process-wide "current session" locale. They are
//! given a [`LocaleProvider`] at construction: either a [`FixedLocale`] or a
//! shared [`LocaleContext`] with scoped overrides. Locale changes on a
//! context are versioned so hosts can re-render date controls.
//!
//! Identifiers are normalized to BCP 47 style: `de_DE.UTF-8@euro` becomes
//! `de-DE`, and `C`/`POSIX` become `en`.

use std::cell::RefCell;
use std::rc::Rc;

use fform_core::{Observable, Subscription};

/// Locale identifier (e.g., `"en"`, `"en-US"`, `"de-DE"`).
pub type Locale = String;

/// Locale used when nothing usable is configured.
pub const FALLBACK_LOCALE: &str = "en";

/// Environment variables consulted by [`detect_system_locale`], in order.
const LOCALE_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_TIME", "LANG"];

/// Supplies the active locale.
pub trait LocaleProvider {
    fn locale(&self) -> Locale;
}

/// A provider that always returns the same locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedLocale(Locale);

impl FixedLocale {
    #[must_use]
    pub fn new(locale: impl AsRef<str>) -> Self {
        Self(normalize_or_fallback(locale.as_ref()))
    }
}

impl LocaleProvider for FixedLocale {
    fn locale(&self) -> Locale {
        self.0.clone()
    }
}

/// Shared, observable locale with a stack of scoped overrides.
///
/// Clones share state. The base locale is versioned; overrides are not,
/// since they are expected to live only for the duration of a scope.
#[derive(Clone, Debug)]
pub struct LocaleContext {
    base: Observable<Locale>,
    scoped: Rc<RefCell<Vec<Locale>>>,
}

impl LocaleContext {
    #[must_use]
    pub fn new(locale: impl AsRef<str>) -> Self {
        Self {
            base: Observable::new(normalize_or_fallback(locale.as_ref())),
            scoped: Rc::default(),
        }
    }

    /// Context seeded from [`detect_system_locale`].
    #[must_use]
    pub fn system() -> Self {
        Self::new(detect_system_locale())
    }

    /// Innermost override, or the base locale.
    #[must_use]
    pub fn current_locale(&self) -> Locale {
        let innermost = self.scoped.borrow().last().cloned();
        innermost.unwrap_or_else(|| self.base.get())
    }

    #[must_use]
    pub fn base_locale(&self) -> Locale {
        self.base.get()
    }

    /// Replace the base locale. Setting the same locale is a no-op.
    pub fn set_locale(&self, locale: impl AsRef<str>) {
        self.base.set(normalize_or_fallback(locale.as_ref()));
    }

    /// Observe base locale changes.
    pub fn subscribe(&self, callback: impl Fn(&Locale) + 'static) -> Subscription {
        self.base.subscribe(callback)
    }

    /// Use `locale` until the returned guard is dropped.
    #[must_use = "dropping this guard clears the locale override"]
    pub fn push_override(&self, locale: impl AsRef<str>) -> LocaleOverride {
        self.scoped
            .borrow_mut()
            .push(normalize_or_fallback(locale.as_ref()));
        LocaleOverride {
            scoped: Rc::clone(&self.scoped),
        }
    }

    /// Bumped on every base locale change.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.base.version()
    }
}

impl LocaleProvider for LocaleContext {
    fn locale(&self) -> Locale {
        self.current_locale()
    }
}

/// Guard for [`LocaleContext::push_override`]. Overrides unwind LIFO.
#[must_use = "dropping this guard clears the locale override"]
#[derive(Debug)]
pub struct LocaleOverride {
    scoped: Rc<RefCell<Vec<Locale>>>,
}

impl Drop for LocaleOverride {
    fn drop(&mut self) {
        self.scoped.borrow_mut().pop();
    }
}

/// Default date and time patterns for a locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormats {
    pub date: &'static str,
    pub time: &'static str,
}

impl DateFormats {
    /// Patterns for `locale`, matched on language and region.
    #[must_use]
    pub fn for_locale(locale: &str) -> Self {
        let (language, region) = locale.split_once('-').unwrap_or((locale, ""));
        let language = language.to_ascii_lowercase();
        let region = region.to_ascii_uppercase();
        let (date, time) = match (language.as_str(), region.as_str()) {
            ("en", "US" | "") => ("%m/%d/%Y", "%I:%M %p"),
            ("en" | "fr" | "es" | "it" | "pt", _) => ("%d/%m/%Y", "%H:%M"),
            ("de" | "ru" | "pl" | "nb" | "fi" | "cs", _) => ("%d.%m.%Y", "%H:%M"),
            ("ja" | "zh" | "ko", _) => ("%Y/%m/%d", "%H:%M"),
            _ => ("%Y-%m-%d", "%H:%M"),
        };
        Self { date, time }
    }

    /// Date and time patterns joined into one.
    #[must_use]
    pub fn date_time(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

/// Locale from the environment: `LC_ALL`, then `LC_TIME`, then `LANG`.
///
/// Only called on request; nothing in this crate reads the environment on
/// its own.
#[must_use]
pub fn detect_system_locale() -> Locale {
    first_usable(LOCALE_ENV_VARS.iter().map(|var| std::env::var(var).ok()))
}

fn first_usable(candidates: impl IntoIterator<Item = Option<String>>) -> Locale {
    candidates
        .into_iter()
        .flatten()
        .find_map(|raw| normalize(&raw))
        .unwrap_or_else(|| FALLBACK_LOCALE.to_owned())
}

fn normalize_or_fallback(raw: &str) -> Locale {
    normalize(raw).unwrap_or_else(|| FALLBACK_LOCALE.to_owned())
}

/// Strip encoding and modifier suffixes and switch to `-` separators.
fn normalize(raw: &str) -> Option<Locale> {
    let end = raw.find(['.', '@']).unwrap_or(raw.len());
    let tag = raw[..end].trim();
    match tag {
        "" => None,
        _ if tag.eq_ignore_ascii_case("c") || tag.eq_ignore_ascii_case("posix") => {
            Some(FALLBACK_LOCALE.to_owned())
        }
        _ => Some(tag.replace('_', "-")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_owned)).collect()
    }

    #[test]
    fn environment_order_is_respected() {
        let locale = first_usable(env(&[None, Some("fr_FR.UTF-8"), Some("en_US.UTF-8")]));
        assert_eq!(locale, "fr-FR");
    }

    #[test]
    fn unusable_environment_falls_back() {
        assert_eq!(first_usable(env(&[None, None, None])), "en");
        assert_eq!(first_usable(env(&[Some(""), Some("C")])), "en");
    }

    #[test]
    fn normalization_strips_suffixes() {
        assert_eq!(normalize("de_DE.UTF-8@euro").as_deref(), Some("de-DE"));
        assert_eq!(normalize("sr_RS@latin").as_deref(), Some("sr-RS"));
        assert_eq!(normalize(".UTF-8"), None);
        assert_eq!(normalize("POSIX").as_deref(), Some("en"));
    }

    #[test]
    fn base_changes_bump_version() {
        let ctx = LocaleContext::new("en");
        let v0 = ctx.version();
        ctx.set_locale("en");
        assert_eq!(ctx.version(), v0);
        ctx.set_locale("de_DE.UTF-8");
        assert!(ctx.version() > v0);
        assert_eq!(ctx.locale(), "de-DE");
    }

    #[test]
    fn overrides_unwind_in_order() {
        let ctx = LocaleContext::new("en");
        let _outer = ctx.push_override("fr");
        {
            let _inner = ctx.push_override("es");
            assert_eq!(ctx.locale(), "es");
        }
        assert_eq!(ctx.locale(), "fr");
        assert_eq!(ctx.base_locale(), "en");
    }

    #[test]
    fn subscribers_see_base_changes() {
        let ctx = LocaleContext::new("en");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = ctx.subscribe(move |locale| sink.borrow_mut().push(locale.clone()));
        ctx.set_locale("ja");
        assert_eq!(*seen.borrow(), vec!["ja".to_string()]);
    }

    #[test]
    fn fixed_locale_is_normalized() {
        assert_eq!(FixedLocale::new("ru_RU.UTF-8").locale(), "ru-RU");
    }

    #[test]
    fn formats_per_locale() {
        assert_eq!(DateFormats::for_locale("en-US").date, "%m/%d/%Y");
        assert_eq!(DateFormats::for_locale("en-GB").date, "%d/%m/%Y");
        assert_eq!(DateFormats::for_locale("de-DE").date_time(), "%d.%m.%Y %H:%M");
        assert_eq!(DateFormats::for_locale("sv").date, "%Y-%m-%d");
        assert_eq!(DateFormats::for_locale("zh-Hant-TW").date, "%Y/%m/%d");
    }
}
