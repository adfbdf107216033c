use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "sitechat")]
#[command(about = "Ask the site assistant about blogs, projects and shares", long_about = None)]
pub struct Args {
    #[arg(short = 'n', long = "new", help = "Start a new conversation")]
    pub new_conversation: bool,

    #[arg(long = "clear", help = "Clear the conversation history and exit")]
    pub clear_history: bool,

    #[arg(long = "history", help = "Print the saved conversation and exit")]
    pub show_history: bool,

    #[arg(long = "no-history", help = "Do not read or write the saved conversation")]
    pub no_history: bool,

    #[arg(long = "api-url", help = "Chat service base URL (e.g., http://localhost:8080)")]
    pub api_url: Option<String>,

    #[arg(long = "timeout", help = "Seconds before a turn is abandoned")]
    pub timeout: Option<u64>,

    #[arg(short = 'v', long = "verbose", help = "Log diagnostics to stderr")]
    pub verbose: bool,

    #[arg(help = "Message to send; starts an interactive session when omitted")]
    pub message: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_words_are_collected() {
        let args = Args::parse_from(["sitechat", "-n", "what", "do", "you", "build?"]);
        assert!(args.new_conversation);
        assert_eq!(args.message.join(" "), "what do you build?");
    }

    #[test]
    fn test_options() {
        let args = Args::parse_from([
            "sitechat",
            "--api-url",
            "http://localhost:8080",
            "--timeout",
            "5",
            "--no-history",
        ]);
        assert_eq!(args.api_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(args.timeout, Some(5));
        assert!(args.no_history);
        assert!(args.message.is_empty());
    }
}
