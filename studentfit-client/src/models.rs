pub const SUPPORTED_MODELS: [&str; 3] = [
    "mistralai/Mistral-7B-Instruct-v0.3",
    "meta-llama/Llama-3.2-3B-Instruct",
    "HuggingFaceH4/zephyr-7b-beta",
];

pub const DEFAULT_MODEL: &str = SUPPORTED_MODELS[0];

pub fn is_supported(model: &str) -> bool {
    SUPPORTED_MODELS.contains(&model)
}
