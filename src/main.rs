//! Supaboss CLI
//!
//! 入口：加载配置、初始化日志、组装 Router、续用固定会话，然后逐行对话。
//! 输入 quit / exit 结束；空行忽略；Ctrl+C 放弃进行中的回合并结束会话。

use std::io::Write;

use anyhow::Context;
use supaboss::config::load_config;
use supaboss::llm::create_llm_from_config;
use supaboss::router::TurnEvent;
use supaboss::session::create_session_service;
use supaboss::{create_router, observability, open_session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded = load_config(None);
    let cfg = loaded.as_ref().cloned().unwrap_or_default();
    observability::init(&cfg.app.log_level);
    if let Err(e) = &loaded {
        tracing::warn!("Config load failed ({}), using defaults", e);
    }

    println!("Supaboss AI CLI - Initializing...");

    let llm = create_llm_from_config(&cfg);
    let router = create_router(&cfg, llm);
    let sessions = create_session_service(cfg.app.session_dir.as_deref(), cfg.app.max_context_turns);
    let mut session = open_session(
        sessions.as_ref(),
        &cfg.app.name,
        &cfg.app.user_id,
        &cfg.app.session_id,
    )
    .await
    .context("Failed to create or retrieve a session")?;

    println!("Session '{}' is active.", session.id);
    println!("\nWelcome to Supaboss AI!");
    println!("I'm here to help you as your AI coach. How can I assist you today?");
    println!("Type 'quit' or 'exit' to end the session.");
    println!("----------------------------------------------------");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush().ok();

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => {
                println!("\nSupaboss AI: Session interrupted. Goodbye!");
                break;
            }
        };
        // stdin 关闭
        let Some(line) = line else {
            println!();
            break;
        };
        let input = line.trim();
        if matches!(input.to_lowercase().as_str(), "quit" | "exit") {
            println!("Supaboss AI: It was great working with you. Goodbye!");
            break;
        }
        if input.is_empty() {
            continue;
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(print_events(event_rx));
        print!("Supaboss AI: ");
        std::io::stdout().flush().ok();

        let cancel = CancellationToken::new();
        let outcome = tokio::select! {
            result = router.run_turn(&mut session, input, Some(&event_tx), &cancel) => Some(result),
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                None
            }
        };
        drop(event_tx);
        let _ = printer.await;
        println!();

        match outcome {
            None => {
                println!("Supaboss AI: Session interrupted. Goodbye!");
                break;
            }
            Some(Ok(reply)) => {
                tracing::debug!("Turn answered by {}", reply.responder);
                if let Err(e) = sessions.save_session(&session).await {
                    tracing::warn!("Failed to save session {}: {}", session.id, e);
                }
            }
            Some(Err(e)) => {
                tracing::error!("An error occurred during the chat loop: {}", e);
                println!("Supaboss AI: {}", e.user_message());
            }
        }
    }

    Ok(())
}

/// 把回合事件写到 stdout：交接语单独一行，回复分段直接拼接
async fn print_events(mut rx: mpsc::UnboundedReceiver<TurnEvent>) {
    let mut stdout = std::io::stdout();
    while let Some(event) = rx.recv().await {
        match event {
            TurnEvent::Delegated {
                preface: Some(preface),
                ..
            } => {
                let _ = writeln!(stdout, "{}", preface);
            }
            TurnEvent::Chunk { text } => {
                let _ = write!(stdout, "{}", text);
            }
            TurnEvent::Delegated { preface: None, .. } | TurnEvent::Done { .. } => {}
        }
        let _ = stdout.flush();
    }
}
