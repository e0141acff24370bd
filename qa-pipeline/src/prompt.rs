//! Grounded prompt construction.

use vector_store::ContextDocument;

/// Instruction block prepended to every generation request.
///
/// Keeps the model inside the retrieved context: answers must come from
/// the passages below, and missing information must be admitted rather
/// than invented.
const GROUNDING_INSTRUCTIONS: &str = "\
You are a question-answering assistant. Answer using ONLY the context \
passages below.

Rules:
1. Base every statement on the provided context. Do not use outside knowledge.
2. If the context does not contain the answer, say so explicitly instead of guessing.
3. When you use a passage, mention its number (for example: \"according to passage 2\").
4. Answer in the same language as the question.";

/// Renders the final prompt: instructions, numbered context passages
/// with their similarity, then the question.
pub fn build_prompt(question: &str, documents: &[ContextDocument]) -> String {
    let mut prompt = String::with_capacity(
        GROUNDING_INSTRUCTIONS.len()
            + question.len()
            + documents.iter().map(|d| d.content.len() + 64).sum::<usize>()
            + 64,
    );

    prompt.push_str(GROUNDING_INSTRUCTIONS);
    prompt.push_str("\n\nContext:\n");
    for (i, doc) in documents.iter().enumerate() {
        prompt.push_str(&format!(
            "\n[passage {} | similarity {:.3}]\n{}\n",
            i + 1,
            doc.similarity_score,
            doc.content.trim()
        ));
    }
    prompt.push_str("\nQuestion: ");
    prompt.push_str(question.trim());
    prompt.push_str("\n\nAnswer:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn doc(content: &str, score: f32, rank: usize) -> ContextDocument {
        ContextDocument {
            content: content.to_string(),
            metadata: BTreeMap::new(),
            similarity_score: score,
            rank,
        }
    }

    #[test]
    fn prompt_numbers_passages_in_rank_order() {
        let docs = vec![doc("first passage", 0.91, 1), doc("second passage", 0.82, 2)];
        let prompt = build_prompt("What is this?", &docs);

        let p1 = prompt.find("[passage 1 | similarity 0.910]").unwrap();
        let p2 = prompt.find("[passage 2 | similarity 0.820]").unwrap();
        assert!(p1 < p2);
        assert!(prompt.contains("first passage"));
        assert!(prompt.contains("second passage"));
    }

    #[test]
    fn prompt_ends_with_question_and_answer_cue() {
        let prompt = build_prompt("  What is this?  ", &[doc("ctx", 0.9, 1)]);
        assert!(prompt.contains("Question: What is this?"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn instructions_precede_context() {
        let prompt = build_prompt("q", &[doc("ctx", 0.9, 1)]);
        let instructions = prompt.find("ONLY the context").unwrap();
        let context = prompt.find("Context:").unwrap();
        assert!(instructions < context);
    }
}
