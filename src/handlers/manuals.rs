//! Manuals handler: folder sync followed by one chat turn over the uploads.

use std::path::Path;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;

use crate::gemini::chat::ChatSession;
use crate::gemini::{ChatService, Content, FileService, Part};
use crate::manuals::{sync_manuals, PollPolicy};
use crate::printer::{status, MarkdownPrinter, Tone};

pub const GREETING: &str = "Hola, confirmo recepción de manuales.";
pub const DEFAULT_QUESTION: &str = "¿Qué temas cubren estos manuales?";

pub struct ChatOptions {
    pub model: String,
    pub system_instruction: String,
    /// `None` skips the chat turn.
    pub question: Option<String>,
    pub markdown: bool,
}

pub struct ManualsHandler;

impl ManualsHandler {
    pub async fn run<S>(service: &S, folder: &Path, poll: PollPolicy, chat: ChatOptions) -> Result<()>
    where
        S: FileService + ChatService + ?Sized,
    {
        let report = sync_manuals(service, folder, poll).await?;
        if report.folder_created {
            status(
                Tone::Info,
                &format!("📁 Folder created: {}. Place the PDF manuals there.", folder.display()),
            );
        }
        let uploaded = report.uploaded();
        if uploaded.is_empty() {
            status(
                Tone::Warning,
                &format!("\n⚠️  No manuals were uploaded. Check the folder {}", folder.display()),
            );
            return Ok(());
        }
        status(
            Tone::Success,
            &format!("\n📚 {} manuals attached to the model context.", uploaded.len()),
        );
        if report.failures() > 0 {
            status(Tone::Warning, &format!("{} manuals could not be uploaded.", report.failures()));
        }

        let Some(question) = chat.question else {
            return Ok(());
        };

        let mut parts = vec![Part::text(GREETING)];
        parts.extend(uploaded.iter().map(|f| Part::file(f)));
        let mut session = ChatSession::start(
            chat.model,
            Some(chat.system_instruction),
            vec![Content::user(parts)],
        );

        println!("\n💬 Starting chat...");
        let reply = session
            .send_message(service, &question)
            .await
            .context("chat request failed")?;
        if chat.markdown && std::io::stdout().is_terminal() {
            println!("\n🤖 AI:");
            MarkdownPrinter::default().print(&reply);
        } else {
            println!("\n🤖 AI: {}", reply);
        }
        Ok(())
    }
}
