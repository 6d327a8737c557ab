//! Question answering: retrieval context + prompt + model call.
//!
//! [`answer_question`] is the entry point shared by the `docchat ask`
//! command and the Telegram bot. The CLI wrappers [`run_context`] and
//! [`run_ask`] print to stdout.

use anyhow::Result;

use docchat_core::{DocumentSource, Retriever};

use crate::config::Config;
use crate::conversation::Turn;
use crate::extract::FileSource;
use crate::llm::{ChatModel, OpenAiCompatClient};

/// Build the prompt sent to the model.
///
/// The model is told to answer only from the document and to say so when
/// the answer is not in it.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Eres un chatbot conectado a un documento PDF del alumno.\n\
         Debes responder EXCLUSIVAMENTE con la información del documento.\n\
         Si no aparece en el PDF, dilo explícitamente.\n\n\
         === CONTEXTO ===\n\
         {context}\n\
         === FIN CONTEXTO ===\n\n\
         Pregunta del usuario: {question}\n\
         Responde en español, de manera clara y directa."
    )
}

/// Answer `question` from the document.
///
/// `history` is the caller's conversation so far; it is read-only here and
/// not sent to the model. A model failure leaves the retriever's index
/// untouched, so a retry does not re-ingest the document.
pub async fn answer_question<S: DocumentSource>(
    retriever: &Retriever<S>,
    model: &dyn ChatModel,
    question: &str,
    history: &[Turn],
    k: usize,
) -> Result<String> {
    let context = retriever.context(question, k).await?;
    let prompt = build_prompt(&context, question);

    tracing::debug!(
        model = model.model_name(),
        context_chars = context.chars().count(),
        history_turns = history.len(),
        "sending prompt"
    );

    let answer = model.complete(&prompt).await?;
    Ok(answer.trim().to_string())
}

/// Retriever over the configured document.
pub fn retriever_from_config(config: &Config) -> Result<Retriever<FileSource>> {
    let chunking = config.chunking.to_chunk_config()?;
    Ok(Retriever::new(
        FileSource::new(&config.document.path),
        chunking,
    ))
}

fn resolve_k(config: &Config, k: Option<usize>) -> Result<usize> {
    match k {
        Some(0) => anyhow::bail!("--k must be >= 1"),
        Some(k) => Ok(k),
        None => Ok(config.retrieval.top_k),
    }
}

/// CLI entry point for `docchat context`.
pub async fn run_context(
    config: &Config,
    question: &str,
    k: Option<usize>,
    explain: bool,
) -> Result<()> {
    let k = resolve_k(config, k)?;
    let retriever = retriever_from_config(config)?;

    if !explain {
        let context = retriever.context(question, k).await?;
        if context.is_empty() {
            println!("No context (document has no text).");
        } else {
            println!("{}", context);
        }
        return Ok(());
    }

    let ranked = retriever.ranked(question, k).await?;
    if ranked.is_empty() {
        println!("No context (document has no text).");
        return Ok(());
    }

    println!(
        "Context: k={}, {} chunk(s) selected",
        k,
        ranked.len()
    );
    println!();
    for (i, r) in ranked.iter().enumerate() {
        println!("{}. [score {}] chunk #{}", i + 1, r.score, r.position);
        println!("    excerpt: \"{}\"", r.text.replace('\n', " ").trim());
        println!();
    }

    Ok(())
}

/// CLI entry point for `docchat ask`.
pub async fn run_ask(config: &Config, question: &str, k: Option<usize>) -> Result<()> {
    let k = resolve_k(config, k)?;
    let retriever = retriever_from_config(config)?;
    let model = OpenAiCompatClient::from_config(&config.llm)?;

    let answer = answer_question(&retriever, &model, question, &[], k).await?;
    println!("{}", answer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docchat_core::{ChunkConfig, StaticSource};
    use std::sync::Mutex;

    /// Records prompts and replies with a fixed answer.
    struct EchoModel {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatModel for EchoModel {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("  El gato se sentó.\n".to_string())
        }
    }

    #[test]
    fn test_resolve_k() {
        let config = Config::minimal("d.txt");
        assert_eq!(resolve_k(&config, None).unwrap(), 4);
        assert_eq!(resolve_k(&config, Some(2)).unwrap(), 2);
        assert!(resolve_k(&config, Some(0)).is_err());
    }

    #[test]
    fn test_prompt_layout() {
        let prompt = build_prompt("fragmento uno\n\nfragmento dos", "¿Quién se sentó?");
        assert!(prompt.starts_with("Eres un chatbot conectado a un documento PDF del alumno.\n"));
        assert!(prompt.contains(
            "=== CONTEXTO ===\nfragmento uno\n\nfragmento dos\n=== FIN CONTEXTO ===\n\n"
        ));
        assert!(prompt.contains("Pregunta del usuario: ¿Quién se sentó?\n"));
        assert!(prompt.ends_with("Responde en español, de manera clara y directa."));
    }

    #[tokio::test]
    async fn test_answer_uses_ranked_context_and_trims() {
        let retriever = Retriever::new(
            StaticSource::new("t", "The cat sat. The dog ran. The cat ran."),
            ChunkConfig::new(20, 5).unwrap(),
        );
        let model = EchoModel {
            prompts: Mutex::new(Vec::new()),
        };
        let history = vec![Turn::user("who sat?")];

        let answer = answer_question(&retriever, &model, "who sat?", &history, 1)
            .await
            .unwrap();
        assert_eq!(answer, "El gato se sentó.");

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("=== CONTEXTO ===\nThe cat sat. The dog\n=== FIN CONTEXTO ==="));
        assert_eq!(history.len(), 1);
    }
}
