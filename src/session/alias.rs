use std::collections::BTreeMap;

/// Alias name to replacement text.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn insert(&mut self, name: impl Into<String>, command: impl Into<String>) {
        self.aliases.insert(name.into(), command.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Replaces the first word of `line` with its alias, once. Lines whose
    /// first word is not an alias come back untouched.
    pub fn expand(&self, line: &str) -> String {
        let trimmed = line.trim_start();
        let end = trimmed
            .find(char::is_whitespace)
            .unwrap_or(trimmed.len());
        let (first, rest) = trimmed.split_at(end);

        match self.get(first) {
            Some(replacement) => format!("{replacement}{rest}"),
            None => line.to_owned(),
        }
    }
}

impl FromIterator<(String, String)> for AliasTable {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            aliases: iter.into_iter().collect(),
        }
    }
}
