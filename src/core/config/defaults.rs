pub const DEFAULT_COMPLETION_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_COMPLETION_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_EMBEDDING_URL: &str = "http://127.0.0.1:8090/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";
/// Output width of all-MiniLM-L6-v2, reused as the hash embedder width.
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;
pub const DEFAULT_STORE_PATH: &str = "chroma_store/store.db";
pub const DEFAULT_COLLECTION: &str = "chat_chunks";
pub const DEFAULT_SOURCE_DIR: &str = "data";

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_MAX_DOC_CHARS: usize = 300;
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 3000;
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 32;
pub const DEFAULT_UPSERT_BATCH_SIZE: usize = 50;

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an Ayurvedic Assistant, an expert in traditional Indian medicine and holistic wellness.

Guidelines:
- Focus only on Ayurvedic health-related advice.
- Start with a warm, brief greeting.
- Ask follow-up or clarifying questions before giving advice.
- Keep responses short (max one paragraph or 3-4 sentences).
- Be conversational, natural, and engaging.
- Base your advice on Ayurvedic principles: natural remedies, herbs, dietary and lifestyle changes.
- If appropriate, briefly explain relevant Ayurvedic concepts like doshas (Vata, Pitta, Kapha), dhatus, etc.
- Use Sanskrit terms only when helpful and explain them.
- Be warm, compassionate, and respectful.
- Never give advice without knowing enough symptoms.
- Emphasize this is not a replacement for professional medical care.";

/// Preamble of the system turn that carries retrieved knowledge.
pub const CONTEXT_PREAMBLE: &str =
    "Use the following Ayurvedic knowledge base for reference only. Do not quote or reference directly:";
