use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.1.0" for releases, "0.1.0@abc1234 2024-01-15" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "devpost", bin_name = "devpost", version = get_version())]
#[command(about = "Post and browse questions and articles", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the home screen
    Home,

    /// Create a new post
    #[command(alias = "n")]
    New {
        #[command(subcommand)]
        post: NewPost,
    },

    /// Find questions
    #[command(alias = "q")]
    Questions {
        #[command(flatten)]
        filter: FilterArgs,

        /// Show the full description of these questions
        #[arg(short, long = "expand", value_name = "ID")]
        expand: Vec<String>,

        /// Keep the list open and redraw it on every change
        #[arg(short, long)]
        watch: bool,
    },

    /// Find articles
    #[command(alias = "a")]
    Articles {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Delete a post
    #[command(alias = "rm")]
    Delete {
        #[command(subcommand)]
        target: DeleteTarget,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (base-url, confirm-deletes)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum NewPost {
    /// Ask a question
    Question {
        /// Start your question with how, what, why, etc.
        #[arg(short, long, default_value = "")]
        title: String,

        /// Details about your question
        #[arg(short, long, default_value = "")]
        description: String,

        /// Up to 3 tags, e.g. "java, web"
        #[arg(long, default_value = "")]
        tags: String,
    },

    /// Share an article
    Article {
        /// A descriptive title
        #[arg(short, long, default_value = "")]
        title: String,

        /// A one-paragraph abstract
        #[arg(short, long = "abstract", default_value = "")]
        abstract_text: String,

        /// The article itself
        #[arg(long = "text", default_value = "")]
        article_text: String,

        /// Up to 3 tags, e.g. "rust, web"
        #[arg(long, default_value = "")]
        tags: String,

        /// Image file to upload with the article
        #[arg(short, long, value_name = "PATH")]
        image: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Filter by title (case-insensitive substring)
    #[arg(long)]
    pub title: Option<String>,

    /// Filter by tag (case-insensitive substring)
    #[arg(long)]
    pub tag: Option<String>,

    /// Filter by date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum DeleteTarget {
    /// Delete a question
    Question {
        id: String,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Delete an article and its image
    Article {
        id: String,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_new_article_with_image() {
        let cli = Cli::try_parse_from([
            "devpost", "new", "article", "--title", "T", "--abstract", "A", "--text", "Body",
            "--image", "pic.png",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::New {
                post:
                    NewPost::Article {
                        title,
                        abstract_text,
                        article_text,
                        image,
                        ..
                    },
            }) => {
                assert_eq!(title, "T");
                assert_eq!(abstract_text, "A");
                assert_eq!(article_text, "Body");
                assert_eq!(image, Some(PathBuf::from("pic.png")));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn parses_question_filters_and_expands() {
        let cli = Cli::try_parse_from([
            "devpost", "q", "--tag", "web", "--date", "2024-06-01", "-e", "a1", "-e", "b2",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Questions {
                filter,
                expand,
                watch,
            }) => {
                assert_eq!(filter.tag.as_deref(), Some("web"));
                assert_eq!(filter.date.as_deref(), Some("2024-06-01"));
                assert_eq!(filter.title, None);
                assert_eq!(expand, vec!["a1".to_string(), "b2".to_string()]);
                assert!(!watch);
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn parses_delete_with_yes() {
        let cli = Cli::try_parse_from(["devpost", "rm", "article", "abc", "-y"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Delete {
                target: DeleteTarget::Article { yes: true, .. }
            })
        ));
    }

    #[test]
    fn no_command_is_home() {
        let cli = Cli::try_parse_from(["devpost"]).unwrap();
        assert!(cli.command.is_none());
    }
}
