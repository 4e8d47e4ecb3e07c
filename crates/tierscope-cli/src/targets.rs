use std::path::Path;

use anyhow::Context;

/// One URL per non-blank line; lines starting with `#` are comments.
pub(crate) fn parse_targets(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub(crate) fn load_targets(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read targets file {}", path.display()))?;
    let targets = parse_targets(&content);
    tracing::debug!(path = %path.display(), count = targets.len(), "targets loaded");
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_and_comment_lines() {
        let content = "\
# creators to check
https://creators.example/alice

   https://creators.example/bob
#https://creators.example/disabled
";
        assert_eq!(
            parse_targets(content),
            vec![
                "https://creators.example/alice".to_string(),
                "https://creators.example/bob".to_string(),
            ]
        );
    }

    #[test]
    fn empty_file_yields_no_targets() {
        assert!(parse_targets("").is_empty());
        assert!(parse_targets("\n\n# nothing\n").is_empty());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_targets(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.txt"));
    }
}
