use std::path::PathBuf;

use envconfig::Envconfig;

/// Settings the workflow runner provides through the environment.
#[derive(Envconfig, Debug, Clone)]
pub struct Env {
    /// `owner/name` of the repository whose statuses are queried.
    #[envconfig(from = "GITHUB_REPOSITORY")]
    pub repository: String,

    #[envconfig(from = "GITHUB_API_URL", default = "https://api.github.com")]
    pub api_url: String,

    #[envconfig(from = "GITHUB_TOKEN")]
    pub token: Option<String>,

    /// Run log (step summary).
    #[envconfig(from = "GITHUB_STEP_SUMMARY")]
    pub summary_path: Option<PathBuf>,

    /// Structured output file receiving `result=<outcome>`.
    #[envconfig(from = "GITHUB_OUTPUT")]
    pub output_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reads_runner_environment() {
        let env = Env::init_from_hashmap(&vars(&[
            ("GITHUB_REPOSITORY", "octo/app"),
            ("GITHUB_TOKEN", "s3cret"),
            ("GITHUB_STEP_SUMMARY", "/tmp/summary.md"),
            ("GITHUB_OUTPUT", "/tmp/output"),
        ]))
        .unwrap();

        assert_eq!(env.repository, "octo/app");
        assert_eq!(env.api_url, "https://api.github.com");
        assert_eq!(env.token.as_deref(), Some("s3cret"));
        assert_eq!(env.summary_path, Some(PathBuf::from("/tmp/summary.md")));
        assert_eq!(env.output_path, Some(PathBuf::from("/tmp/output")));
    }

    #[test]
    fn optional_paths_may_be_absent() {
        let env = Env::init_from_hashmap(&vars(&[
            ("GITHUB_REPOSITORY", "octo/app"),
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3"),
        ]))
        .unwrap();

        assert_eq!(env.api_url, "https://ghe.example.com/api/v3");
        assert!(env.token.is_none());
        assert!(env.summary_path.is_none());
        assert!(env.output_path.is_none());
    }

    #[test]
    fn repository_is_required() {
        assert!(Env::init_from_hashmap(&vars(&[])).is_err());
    }
}
