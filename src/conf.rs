use std::path::Path;

use es_bulk_action::BulkAction;
use twelf::reexports::serde::{Deserialize, Serialize};
use twelf::{config, Layer};

pub const ENV_PREFIX: &str = "ES_BULK_";

#[config]
#[derive(Debug, Default)]
pub struct Config {
    /// Index used for actions that do not name one.
    #[serde(default)]
    default_index: Option<String>,
    /// Type used for actions that do not name one.
    #[serde(default)]
    default_type: Option<String>,
    /// Skip input lines that are not valid actions instead of failing.
    #[serde(default)]
    skip_invalid: bool,
    /// Skip actions whose source contains raw line breaks instead of only warning.
    #[serde(default)]
    reject_framing_hazards: bool,
}

impl Config {
    /// Loads the optional config file (TOML, or JSON for `.json` paths) and
    /// overlays `ES_BULK_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, twelf::Error> {
        let env = Layer::Env(Some(ENV_PREFIX.to_string()));
        match path {
            Some(path) => {
                let file = match path.extension().and_then(|ext| ext.to_str()) {
                    Some("json") => Layer::Json(path.to_path_buf()),
                    _ => Layer::Toml(path.to_path_buf()),
                };
                Config::with_layers(&[file, env])
            }
            None => Config::with_layers(&[env]),
        }
    }

    pub fn get_default_index(&self) -> Option<&str> {
        self.default_index.as_deref()
    }
    pub fn get_default_type(&self) -> Option<&str> {
        self.default_type.as_deref()
    }
    pub fn is_skip_invalid(&self) -> bool {
        self.skip_invalid
    }
    pub fn is_reject_framing_hazards(&self) -> bool {
        self.reject_framing_hazards
    }

    /// Fills in the configured index and type where the action has none.
    pub fn apply_defaults(&self, action: BulkAction) -> BulkAction {
        let mut builder = action.to_builder();
        let mut changed = false;

        if let (None, Some(index)) = (action.get_index(), &self.default_index) {
            builder = builder.index(index.clone());
            changed = true;
        }
        if let (None, Some(doc_type)) = (action.get_type(), &self.default_type) {
            builder = builder.doc_type(doc_type.clone());
            changed = true;
        }

        if !changed {
            return action;
        }
        builder.build().unwrap_or(action)
    }
}
