//! Commit message rendering.
//!
//! Templates are Jinja-style and see:
//!
//! ```text
//! AutomationObject.Name, AutomationObject.Namespace
//! Updated.Files[path].Objects[id] -> [image, ...]
//! Updated.Images -> [image, ...]
//! ```

use std::collections::BTreeMap;

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::object::ObjectMeta;
use crate::update::{FileResult, UpdateResult};

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TemplateData<'a> {
    automation_object: AutomationObject<'a>,
    updated: Updated<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AutomationObject<'a> {
    name: &'a str,
    namespace: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Updated<'a> {
    files: &'a BTreeMap<String, FileResult>,
    images: Vec<String>,
}

/// Render `template` for `automation` and the mutation `result`.
///
/// An empty template renders `default_template` instead. Referencing an
/// undefined value is an error.
///
/// # Errors
/// Returns [`Error::Template`] if the template does not parse or render.
pub fn render_commit_message(
    template: &str,
    default_template: &str,
    automation: &ObjectMeta,
    result: &UpdateResult,
) -> Result<String> {
    let template = if template.is_empty() {
        default_template
    } else {
        template
    };

    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);

    let data = TemplateData {
        automation_object: AutomationObject {
            name: &automation.name,
            namespace: &automation.namespace,
        },
        updated: Updated {
            files: &result.files,
            images: result.images(),
        },
    };

    env.render_str(template, data)
        .map_err(|e| Error::Template(format!("unable to render commit message template: {e}")))
}
