pub mod domain;
pub mod episode;
pub mod pipeline;
pub mod ports;
pub mod prompt;

pub use domain::{Article, AudioPayload, Episode, GeneratedEpisode, NewEpisode};
pub use pipeline::{PipelineSettings, PodcastPipeline, DEFAULT_ARTICLE_LIMIT};
pub use ports::{
    ArticleStore, EpisodeStore, ObjectStorage, PipelineError, PipelineResult, ScriptGenerator,
    SpeechSynthesizer,
};
