//! `model_info.list`: numeric model codes to canonical model names.

use crate::line::{split, strip_comment};
use std::collections::BTreeMap;

/// Resolves `model_number` against index text. The last matching row wins.
pub fn resolve_name(text: &str, model_number: u16) -> Option<String> {
    let mut name = None;
    for (number, row_name) in rows(text) {
        if number == model_number {
            name = Some(row_name);
        }
    }
    name.map(str::to_string)
}

fn rows(text: &str) -> impl Iterator<Item = (u16, &str)> {
    text.lines().filter_map(|raw| {
        let tokens = split(strip_comment(raw), '|');
        if tokens.len() != 2 {
            return None;
        }
        let number = tokens[0].parse::<u16>().ok()?;
        Some((number, tokens[1]))
    })
}

/// Whole index parsed once, for hosts that resolve many models.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ModelIndex {
    names: BTreeMap<u16, String>,
}

impl ModelIndex {
    pub fn parse(text: &str) -> Self {
        let mut names = BTreeMap::new();
        for (number, name) in rows(text) {
            names.insert(number, name.to_string());
        }
        Self { names }
    }

    pub fn name_of(&self, model_number: u16) -> Option<&str> {
        self.names.get(&model_number).map(String::as_str)
    }

    /// Reverse lookup; when several numbers share a name the highest wins.
    pub fn number_of(&self, model_name: &str) -> Option<u16> {
        self.names
            .iter()
            .rev()
            .find(|(_, name)| name.as_str() == model_name)
            .map(|(&number, _)| number)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
