//! Rendering of per-base-branch pull request fields
//!
//! Each of the head branch name, title, body and labels is a Tera template
//! rendered with two variables: `base` (the branch receiving the sync) and
//! `head` (the pushed branch). Rendering is pure, so the same pair always
//! produces the same synthetic head branch.

use std::error::Error as StdError;

use serde::Serialize;
use tera::{Context, Tera};

use crate::config::TemplateConfig;
use crate::{Error, Result};

const HEAD: &str = "head";
const TITLE: &str = "title";
const BODY: &str = "body";
const LABELS: &str = "labels";

/// Variables available to every template
#[derive(Debug, Clone, Serialize)]
pub struct TemplateVars<'a> {
    /// Branch that will receive the pull request
    pub base: &'a str,
    /// Branch that was pushed
    pub head: &'a str,
}

/// Fields rendered for one base branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTarget {
    /// Synthetic branch carrying the sync
    pub head: String,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// The four compiled templates
#[derive(Debug)]
pub struct TemplateSet {
    tera: Tera,
}

impl TemplateSet {
    /// Compile templates from configuration
    pub fn new(config: &TemplateConfig) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(vec![
            (HEAD, config.head.as_str()),
            (TITLE, config.title.as_str()),
            (BODY, config.body.as_str()),
            (LABELS, config.labels.as_str()),
        ])
        .map_err(|e| Error::Template(describe(&e)))?;

        Ok(Self { tera })
    }

    /// Render every field for one (base, head) pair
    pub fn render(&self, vars: &TemplateVars<'_>) -> Result<RenderedTarget> {
        let context =
            Context::from_serialize(vars).map_err(|e| Error::Template(describe(&e)))?;

        let head = self.render_one(HEAD, &context)?.trim().to_string();
        if head.is_empty() {
            return Err(Error::Template(format!(
                "Head template rendered an empty branch name for base {}",
                vars.base
            )));
        }

        let labels_json = self.render_one(LABELS, &context)?;
        let labels = parse_labels(&labels_json)?;

        Ok(RenderedTarget {
            head,
            title: self.render_one(TITLE, &context)?,
            body: self.render_one(BODY, &context)?,
            labels,
        })
    }

    fn render_one(&self, name: &str, context: &Context) -> Result<String> {
        self.tera
            .render(name, context)
            .map_err(|e| Error::Template(describe(&e)))
    }
}

fn parse_labels(json: &str) -> Result<Vec<String>> {
    serde_json::from_str::<Vec<String>>(json).map_err(|e| {
        Error::Template(format!(
            "Could not parse labels from invalid JSON: {}. ({})",
            json, e
        ))
    })
}

// Tera's top-level messages omit the interesting part, which lives in the source chain.
fn describe(err: &tera::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
