//! Path classification: overwrite risk and merge strategy selection
//!
//! Classification is a pure, total function of the path and whether the
//! file existed before deployment. It never reads the filesystem.

/// How dangerous it is to silently overwrite a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    /// File did not exist before deployment; nothing to lose.
    Low,
    /// Pre-existing structured file.
    Medium,
    /// A path that commonly holds hand-authored identity or security
    /// content.
    High,
}

/// The merge strategy applied to a file during restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Anchor-delimited region merge for long-form documents.
    SectionMerge,
    /// Line-entry merge for ignore-pattern files.
    EntryMerge,
    /// Two-way structured merge over JSON.
    JsonMerge,
    /// Two-way structured merge over YAML.
    YamlDeep,
    /// Three-way structured merge over YAML; selected by the restore walk
    /// when a base snapshot exists for the path, never by `classify`.
    Yaml3Way,
    /// Deduplicated line union for everything else.
    LineMerge,
}

/// Basenames that commonly hold hand-authored identity/security content.
/// Matched case-sensitively, anywhere in the tree.
pub const HIGH_RISK_BASENAMES: &[&str] = &["identity.yaml", "credentials.json", "security.yaml"];

/// Classify a path into a risk level and merge strategy.
///
/// `path` is relative to the configuration root; `exists_before` reports
/// whether the file existed before the template was deployed.
pub fn classify(path: &str, exists_before: bool) -> (RiskLevel, MergeStrategy) {
    let basename = path.rsplit('/').next().unwrap_or(path);

    let risk = if HIGH_RISK_BASENAMES.contains(&basename) {
        RiskLevel::High
    } else if !exists_before {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    };

    let strategy = strategy_for(basename);

    (risk, strategy)
}

fn strategy_for(basename: &str) -> MergeStrategy {
    let extension = basename
        .rfind('.')
        .filter(|idx| *idx > 0)
        .map(|idx| &basename[idx + 1..])
        .unwrap_or("");

    if matches!(extension, "md" | "markdown") {
        MergeStrategy::SectionMerge
    } else if basename.ends_with("ignore") {
        MergeStrategy::EntryMerge
    } else if extension == "json" {
        MergeStrategy::JsonMerge
    } else if matches!(extension, "yaml" | "yml") {
        MergeStrategy::YamlDeep
    } else {
        MergeStrategy::LineMerge
    }
}
