// SPDX-License-Identifier: MPL-2.0
//! Fluent bundles loaded from the embedded `assets/i18n/*.ftl` files.

use crate::config::Config;
use fluent_bundle::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use rust_embed::RustEmbed;
use std::collections::HashMap;
use unic_langid::{langid, LanguageIdentifier};

#[derive(RustEmbed)]
#[folder = "assets/i18n/"]
struct Asset;

const DEFAULT_LOCALE: LanguageIdentifier = langid!("en-US");

pub struct I18n {
    bundles: HashMap<LanguageIdentifier, FluentBundle<FluentResource>>,
    available_locales: Vec<LanguageIdentifier>,
    current_locale: LanguageIdentifier,
}

impl Default for I18n {
    fn default() -> Self {
        Self::new(None, &Config::default())
    }
}

impl std::fmt::Debug for I18n {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18n")
            .field("available_locales", &self.available_locales)
            .field("current_locale", &self.current_locale)
            .finish_non_exhaustive()
    }
}

fn load_bundle(locale: &LanguageIdentifier, source: String) -> Option<FluentBundle<FluentResource>> {
    let resource = match FluentResource::try_new(source) {
        Ok(resource) => resource,
        Err((_, errors)) => {
            eprintln!("[i18n] {locale}: {} parse error(s)", errors.len());
            return None;
        }
    };
    let mut bundle = FluentBundle::new(vec![locale.clone()]);
    // Isolation marks render as stray glyphs in iced text widgets.
    bundle.set_use_isolating(false);
    if let Err(errors) = bundle.add_resource(resource) {
        eprintln!("[i18n] {locale}: {} duplicate message(s)", errors.len());
    }
    Some(bundle)
}

impl I18n {
    /// Loads every embedded locale and picks the active one.
    ///
    /// Resolution order: `cli_lang`, then `config.general.language`, then the
    /// OS locale, then `en-US`.
    pub fn new(cli_lang: Option<String>, config: &Config) -> Self {
        let mut bundles = HashMap::new();
        let mut available_locales = Vec::new();

        for file in Asset::iter() {
            let filename = file.as_ref();
            let Some(locale) = filename
                .strip_suffix(".ftl")
                .and_then(|stem| stem.parse::<LanguageIdentifier>().ok())
            else {
                continue;
            };
            let Some(content) = Asset::get(filename) else {
                continue;
            };
            let source = String::from_utf8_lossy(content.data.as_ref()).into_owned();
            if let Some(bundle) = load_bundle(&locale, source) {
                bundles.insert(locale.clone(), bundle);
                available_locales.push(locale);
            }
        }
        available_locales.sort_by_key(ToString::to_string);

        let current_locale =
            resolve_locale(cli_lang, config, &available_locales).unwrap_or(DEFAULT_LOCALE);

        Self {
            bundles,
            available_locales,
            current_locale,
        }
    }

    #[must_use]
    pub fn available_locales(&self) -> &[LanguageIdentifier] {
        &self.available_locales
    }

    #[must_use]
    pub fn current_locale(&self) -> &LanguageIdentifier {
        &self.current_locale
    }

    /// Switches language. Unknown locales are ignored.
    pub fn set_locale(&mut self, locale: LanguageIdentifier) {
        if self.bundles.contains_key(&locale) {
            self.current_locale = locale;
        }
    }

    #[must_use]
    pub fn tr(&self, key: &str) -> String {
        self.format(key, None)
    }

    #[must_use]
    pub fn tr_with_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            // Numeric strings become numbers so plural selectors work.
            match value.parse::<f64>() {
                Ok(number) => fluent_args.set(*name, FluentValue::from(number)),
                Err(_) => fluent_args.set(*name, FluentValue::from(*value)),
            }
        }
        self.format(key, Some(&fluent_args))
    }

    fn format(&self, key: &str, args: Option<&FluentArgs<'_>>) -> String {
        let bundle = self
            .bundles
            .get(&self.current_locale)
            .or_else(|| self.bundles.get(&DEFAULT_LOCALE));
        if let Some(bundle) = bundle {
            if let Some(pattern) = bundle.get_message(key).and_then(|msg| msg.value()) {
                let mut errors = vec![];
                let value = bundle.format_pattern(pattern, args, &mut errors);
                if errors.is_empty() {
                    return value.into_owned();
                }
            }
        }
        format!("MISSING: {key}")
    }
}

fn parse_available(raw: &str, available: &[LanguageIdentifier]) -> Option<LanguageIdentifier> {
    let lang = raw.parse::<LanguageIdentifier>().ok()?;
    if available.contains(&lang) {
        return Some(lang);
    }
    // "ru-RU" falls back to "ru".
    available
        .iter()
        .find(|candidate| candidate.language == lang.language)
        .cloned()
}

fn resolve_locale(
    cli_lang: Option<String>,
    config: &Config,
    available: &[LanguageIdentifier],
) -> Option<LanguageIdentifier> {
    if let Some(lang) = cli_lang.and_then(|raw| parse_available(&raw, available)) {
        return Some(lang);
    }

    if let Some(lang) = config
        .general
        .language
        .as_deref()
        .and_then(|raw| parse_available(raw, available))
    {
        return Some(lang);
    }

    sys_locale::get_locale().and_then(|raw| parse_available(&raw, available))
}
