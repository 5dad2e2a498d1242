use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use cardline_agent::actions::GREETING;
use cardline_agent::llm::{self, MISSING_API_KEY_MESSAGE};
use cardline_agent::{AgentSettings, VirtualAgent};
use cardline_core::config::{AppConfig, LoadOptions};
use cardline_core::domain::conversation::ConversationState;
use cardline_core::SharedAccount;

use super::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("chat", "config_validation", error.to_string(), 2)
        }
    };

    let completion = match llm::from_config(&config.llm) {
        Ok(completion) => completion,
        Err(error) => {
            return CommandResult::failure("chat", "completion_client", error.to_string(), 2)
        }
    };
    if !completion.is_configured() {
        return CommandResult::failure(
            "chat",
            "completion_unconfigured",
            MISSING_API_KEY_MESSAGE,
            2,
        );
    }

    let agent =
        VirtualAgent::new(SharedAccount::default(), completion, AgentSettings::from(&config));
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "chat",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                1,
            )
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    match runtime.block_on(converse_loop(&agent, stdin.lock(), &mut stdout.lock())) {
        Ok(summary) => CommandResult::success("chat", summary),
        Err(error) => CommandResult::failure("chat", "io", format!("{error:#}"), 1),
    }
}

/// Drives the agent one line at a time until EOF, `exit`/`quit`, or a live-agent transfer.
/// Turn errors are printed and the session continues.
pub async fn converse_loop<R, W>(agent: &VirtualAgent, mut input: R, output: &mut W) -> Result<String>
where
    R: BufRead,
    W: Write,
{
    let mut state = ConversationState::new();
    let mut turns = 0usize;
    writeln!(output, "Tracy: {GREETING}").context("failed to write greeting")?;

    loop {
        write!(output, "> ").context("failed to write prompt")?;
        output.flush().context("failed to flush prompt")?;

        let mut line = String::new();
        if input.read_line(&mut line).context("failed to read input")? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message.to_ascii_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        turns += 1;
        let correlation_id = format!("cli-chat-{turns}");
        match agent.converse(&mut state, message, &correlation_id).await {
            Ok(reply) => {
                writeln!(output, "Tracy: {}", reply.response).context("failed to write reply")?;
                if !reply.suggested_actions.is_empty() {
                    writeln!(output, "  suggestions: {}", reply.suggested_actions.join(" | "))
                        .context("failed to write suggestions")?;
                }
                if reply.transfer_to_agent {
                    writeln!(output, "[transferring to a live agent]")
                        .context("failed to write transfer notice")?;
                    break;
                }
            }
            Err(error) => {
                writeln!(output, "[error] {error}").context("failed to write error")?;
            }
        }
    }

    let status = agent.card_status()?;
    Ok(format!(
        "{turns} turns, off-topic count {}, card status {status}",
        state.off_topic_count()
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use cardline_agent::llm::{CompletionError, ScriptedCompletionClient};
    use cardline_agent::{AgentSettings, VirtualAgent};
    use cardline_core::SharedAccount;

    use super::converse_loop;

    fn agent(client: ScriptedCompletionClient) -> VirtualAgent {
        VirtualAgent::new(SharedAccount::default(), Arc::new(client), AgentSettings::default())
    }

    #[tokio::test]
    async fn freeze_request_is_applied_and_summarized() {
        let agent = agent(ScriptedCompletionClient::constant("Your card is frozen."));
        let mut output = Vec::new();

        let summary = converse_loop(&agent, Cursor::new("freeze my card\nexit\n"), &mut output)
            .await
            .expect("session");

        let transcript = String::from_utf8(output).expect("utf8");
        assert!(transcript.contains("Tracy: Your card is frozen."));
        assert!(transcript.contains("suggestions: Freeze card now | Unfreeze card"));
        assert_eq!(summary, "1 turns, off-topic count 0, card status frozen");
    }

    #[tokio::test]
    async fn third_off_topic_turn_ends_the_session() {
        let agent = agent(ScriptedCompletionClient::constant("unused"));
        let mut output = Vec::new();
        let input = "what's the weather?\ntell me a joke\nfavorite movie?\nwhat's my balance\n";

        let summary =
            converse_loop(&agent, Cursor::new(input), &mut output).await.expect("session");

        let transcript = String::from_utf8(output).expect("utf8");
        assert!(transcript.contains("[transferring to a live agent]"));
        assert_eq!(summary, "3 turns, off-topic count 3, card status active");
    }

    #[tokio::test]
    async fn completion_errors_do_not_end_the_session() {
        let agent = agent(ScriptedCompletionClient::new(vec![
            Err(CompletionError::Transport("connection reset".to_string())),
            Ok("Your balance is $16,475.00.".to_string()),
        ]));
        let mut output = Vec::new();

        converse_loop(&agent, Cursor::new("balance?\n\nbalance again?\n"), &mut output)
            .await
            .expect("session");

        let transcript = String::from_utf8(output).expect("utf8");
        assert!(transcript.contains("[error]"));
        assert!(transcript.contains("Tracy: Your balance is $16,475.00."));
    }
}
