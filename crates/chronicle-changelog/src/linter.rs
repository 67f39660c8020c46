//! Linting for change fragments and combined changelog files

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use serde_yaml::Value;
use tracing::debug;

use chronicle_core::config::ChangelogConfig;

/// One structured lint diagnostic.
///
/// Fragment validation is not position-aware, so line and column are always
/// zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl LintFinding {
    fn new(path: &Path, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            line: 0,
            column: 0,
            message: message.into(),
        }
    }
}

impl fmt::Display for LintFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.path.display(),
            self.line,
            self.column,
            self.message
        )
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Validates fragment structure against the section schema and checks prose
/// for markup errors. Never mutates its input.
pub struct FragmentLinter {
    config: ChangelogConfig,
    bare_directive: Regex,
    bare_role: Regex,
}

impl FragmentLinter {
    /// Create a linter for the given configuration.
    pub fn new(config: &ChangelogConfig) -> Self {
        Self {
            config: config.clone(),
            // ".. name:" with a single colon is a truncated directive
            bare_directive: Regex::new(r"^\.\. +[A-Za-z][\w-]*:(?:$| )").unwrap(),
            // ":role:" must be followed by a backtick-quoted target
            bare_role: Regex::new(r":[a-z][a-z0-9_-]*:(?:[^`]|$)").unwrap(),
        }
    }

    /// Lint a fragment loaded as an untyped YAML value.
    pub fn lint(&self, path: &Path, content: &Value) -> Vec<LintFinding> {
        let mut findings = Vec::new();

        let Value::Mapping(mapping) = content else {
            findings.push(LintFinding::new(
                path,
                format!("file must be a mapping not {}", type_name(content)),
            ));
            return findings;
        };

        for (key, value) in mapping {
            let Value::String(section) = key else {
                findings.push(LintFinding::new(
                    path,
                    format!("section name must be type str not {}", type_name(key)),
                ));
                continue;
            };
            self.lint_section(&mut findings, path, section, value);
            self.lint_lines(&mut findings, path, section, value);
        }

        debug!(path = %path.display(), count = findings.len(), "fragment linted");
        findings
    }

    fn lint_section(&self, findings: &mut Vec<LintFinding>, path: &Path, section: &str, value: &Value) {
        if section == self.config.prelude_name {
            if !matches!(value, Value::String(_)) {
                findings.push(LintFinding::new(
                    path,
                    format!(
                        "section \"{}\" must be type str not {}",
                        section,
                        type_name(value)
                    ),
                ));
            }
            return;
        }

        if !matches!(value, Value::Sequence(_)) {
            findings.push(LintFinding::new(
                path,
                format!(
                    "section \"{}\" must be type list not {}",
                    section,
                    type_name(value)
                ),
            ));
        }

        if !self.config.is_known_section(section) {
            findings.push(LintFinding::new(path, format!("invalid section: {section}")));
        }
    }

    fn lint_lines(&self, findings: &mut Vec<LintFinding>, path: &Path, section: &str, value: &Value) {
        match value {
            Value::Sequence(lines) => {
                for line in lines {
                    match line {
                        Value::String(text) => self.check_rst(findings, path, text),
                        other => findings.push(LintFinding::new(
                            path,
                            format!(
                                "section \"{}\" list items must be type str not {}",
                                section,
                                type_name(other)
                            ),
                        )),
                    }
                }
            }
            Value::String(text) => self.check_rst(findings, path, text),
            _ => {}
        }
    }

    /// Lightweight RST syntax check on a prose line or paragraph.
    fn check_rst(&self, findings: &mut Vec<LintFinding>, path: &Path, text: &str) {
        let double_backticks = text.matches("``").count();
        if double_backticks % 2 != 0 {
            findings.push(LintFinding::new(path, "unmatched inline literal markup (``)"));
        }

        let stripped = text.replace("``", "");
        if stripped.matches('`').count() % 2 != 0 {
            findings.push(LintFinding::new(path, "unmatched backtick (`)"));
        }

        for line in text.lines() {
            if self.bare_directive.is_match(line.trim_start()) {
                findings.push(LintFinding::new(
                    path,
                    format!("malformed directive, expected \"::\": {}", line.trim()),
                ));
            }
        }

        if self.bare_role.is_match(&stripped) && !stripped.contains(":`") {
            findings.push(LintFinding::new(
                path,
                "role markup without backtick-quoted target",
            ));
        }
    }
}

/// Lint a whole combined changelog file.
///
/// Findings are collected, never raised; an unreadable or unparseable file
/// produces a single finding.
pub fn lint_changelog_file(path: &Path, config: &ChangelogConfig) -> Vec<LintFinding> {
    let mut findings = Vec::new();

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            findings.push(LintFinding::new(path, format!("error while reading file: {e}")));
            return findings;
        }
    };
    let document: Value = match serde_yaml::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            findings.push(LintFinding::new(path, format!("error while parsing YAML: {e}")));
            return findings;
        }
    };

    let Value::Mapping(top) = &document else {
        findings.push(LintFinding::new(
            path,
            format!("document must be a mapping not {}", type_name(&document)),
        ));
        return findings;
    };

    let scheme = match config.version_scheme() {
        Ok(scheme) => scheme,
        Err(e) => {
            findings.push(LintFinding::new(path, format!("invalid version scheme: {e}")));
            return findings;
        }
    };

    let ancestor = match top.get("ancestor") {
        None | Some(Value::Null) => None,
        Some(Value::String(ancestor)) => {
            if let Err(e) = scheme.validate(ancestor) {
                findings.push(LintFinding::new(
                    path,
                    format!("invalid ancestor version \"{ancestor}\": {e}"),
                ));
                None
            } else {
                Some(ancestor.clone())
            }
        }
        Some(other) => {
            findings.push(LintFinding::new(
                path,
                format!("'ancestor' must be null or str, but got {}", type_name(other)),
            ));
            None
        }
    };

    let fragment_linter = FragmentLinter::new(config);

    match top.get("releases") {
        Some(Value::Mapping(releases)) => {
            for (version, entry) in releases {
                let Value::String(version) = version else {
                    findings.push(LintFinding::new(
                        path,
                        format!("release version must be str not {}", type_name(version)),
                    ));
                    continue;
                };
                if let Err(e) = scheme.validate(version) {
                    findings.push(LintFinding::new(
                        path,
                        format!("invalid release version \"{version}\": {e}"),
                    ));
                } else if let Some(ancestor) = &ancestor {
                    if scheme.compare(version, ancestor).ok()
                        != Some(std::cmp::Ordering::Greater)
                    {
                        findings.push(LintFinding::new(
                            path,
                            format!(
                                "release version \"{version}\" must come after ancestor version \"{ancestor}\""
                            ),
                        ));
                    }
                }

                let Value::Mapping(entry) = entry else {
                    findings.push(LintFinding::new(
                        path,
                        format!(
                            "'releases' -> '{version}' must be a mapping not {}",
                            type_name(entry)
                        ),
                    ));
                    continue;
                };
                lint_release_entry(&mut findings, path, &fragment_linter, version, entry);
            }
        }
        Some(other) => findings.push(LintFinding::new(
            path,
            format!("'releases' must be a mapping not {}", type_name(other)),
        )),
        None => findings.push(LintFinding::new(path, "'releases' is missing")),
    }

    findings
}

fn lint_release_entry(
    findings: &mut Vec<LintFinding>,
    path: &Path,
    fragment_linter: &FragmentLinter,
    version: &str,
    entry: &serde_yaml::Mapping,
) {
    if let Some(codename) = entry.get("codename") {
        if !matches!(codename, Value::Null | Value::String(_)) {
            findings.push(LintFinding::new(
                path,
                format!(
                    "'releases' -> '{version}' -> 'codename' must be null or str, but got {}",
                    type_name(codename)
                ),
            ));
        }
    }

    match entry.get("changes") {
        None | Some(Value::Null) => {}
        Some(changes @ Value::Mapping(_)) => {
            findings.extend(fragment_linter.lint(path, changes));
        }
        Some(other) => findings.push(LintFinding::new(
            path,
            format!(
                "'releases' -> '{version}' -> 'changes' must be a mapping not {}",
                type_name(other)
            ),
        )),
    }

    match entry.get("modules") {
        None | Some(Value::Null) => {}
        Some(Value::Sequence(modules)) => {
            for module in modules {
                lint_plugin_record(findings, path, version, "modules", module, true);
            }
        }
        Some(other) => findings.push(LintFinding::new(
            path,
            format!(
                "'releases' -> '{version}' -> 'modules' must be a list not {}",
                type_name(other)
            ),
        )),
    }

    match entry.get("plugins") {
        None | Some(Value::Null) => {}
        Some(Value::Mapping(plugins)) => {
            for (plugin_type, list) in plugins {
                if !matches!(plugin_type, Value::String(_)) {
                    findings.push(LintFinding::new(
                        path,
                        format!(
                            "'releases' -> '{version}' -> 'plugins' keys must be str not {}",
                            type_name(plugin_type)
                        ),
                    ));
                }
                match list {
                    Value::Sequence(list) => {
                        for plugin in list {
                            lint_plugin_record(findings, path, version, "plugins", plugin, false);
                        }
                    }
                    other => findings.push(LintFinding::new(
                        path,
                        format!(
                            "'releases' -> '{version}' -> 'plugins' values must be lists not {}",
                            type_name(other)
                        ),
                    )),
                }
            }
        }
        Some(other) => findings.push(LintFinding::new(
            path,
            format!(
                "'releases' -> '{version}' -> 'plugins' must be a mapping not {}",
                type_name(other)
            ),
        )),
    }

    match entry.get("fragments") {
        None | Some(Value::Null) => {}
        Some(Value::Sequence(fragments)) => {
            for fragment in fragments {
                if !matches!(fragment, Value::String(_)) {
                    findings.push(LintFinding::new(
                        path,
                        format!(
                            "'releases' -> '{version}' -> 'fragments' entries must be str not {}",
                            type_name(fragment)
                        ),
                    ));
                }
            }
        }
        Some(other) => findings.push(LintFinding::new(
            path,
            format!(
                "'releases' -> '{version}' -> 'fragments' must be a list not {}",
                type_name(other)
            ),
        )),
    }
}

fn lint_plugin_record(
    findings: &mut Vec<LintFinding>,
    path: &Path,
    version: &str,
    field: &str,
    record: &Value,
    is_module: bool,
) {
    let Value::Mapping(record) = record else {
        findings.push(LintFinding::new(
            path,
            format!(
                "'releases' -> '{version}' -> '{field}' entries must be mappings not {}",
                type_name(record)
            ),
        ));
        return;
    };

    match record.get("name") {
        Some(Value::String(name)) => {
            if name.contains('.') {
                findings.push(LintFinding::new(
                    path,
                    format!("plugin name \"{name}\" in release {version} must not be fully qualified"),
                ));
            }
        }
        other => findings.push(LintFinding::new(
            path,
            format!(
                "plugin entry in release {version} needs a str 'name', but got {}",
                other.map_or("nothing", type_name)
            ),
        )),
    }

    if !matches!(record.get("description"), Some(Value::String(_))) {
        findings.push(LintFinding::new(
            path,
            format!("plugin entry in release {version} needs a str 'description'"),
        ));
    }

    let namespace = record.get("namespace");
    if is_module {
        match namespace {
            None | Some(Value::Null) => {}
            Some(Value::String(namespace)) => {
                if namespace.contains(' ') || namespace.contains('/') || namespace.contains('\\') {
                    findings.push(LintFinding::new(
                        path,
                        format!(
                            "module namespace \"{namespace}\" in release {version} must not contain spaces or slashes"
                        ),
                    ));
                }
            }
            Some(other) => findings.push(LintFinding::new(
                path,
                format!(
                    "module namespace in release {version} must be null or str, but got {}",
                    type_name(other)
                ),
            )),
        }
    } else if !matches!(namespace, None | Some(Value::Null)) {
        findings.push(LintFinding::new(
            path,
            format!("plugin namespace in release {version} must be null"),
        ));
    }
}
