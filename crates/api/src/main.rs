use std::sync::Arc;

use anyhow::Context;
use linguaflow_api::{build_router, state::AppState};
use linguaflow_config::Settings;
use linguaflow_services::assessment::AssessmentService;
use linguaflow_services::catalog::{Catalog, MongoCatalog};
use linguaflow_services::proficiency::{MongoProficiencyStore, ProficiencyStore};
use linguaflow_services::questions::{QuestionSource, RemoteQuestionSource};
use linguaflow_services::speech::{RemoteSpeechEvaluator, SpeechEvaluator};
use linguaflow_services::store::{EphemeralStore, RedisStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Arc::new(Settings::load().context("failed to load settings")?);

    let db = linguaflow_db::connect(&settings.mongo)
        .await
        .context("failed to connect to mongodb")?;
    linguaflow_db::indexes::ensure_indexes(&db)
        .await
        .context("failed to ensure indexes")?;

    let store: Arc<dyn EphemeralStore> = Arc::new(
        RedisStore::connect(&settings.redis.url)
            .await
            .context("failed to connect to redis")?,
    );
    let questions: Arc<dyn QuestionSource> =
        Arc::new(RemoteQuestionSource::new(settings.question_source.clone()));
    let evaluator: Arc<dyn SpeechEvaluator> =
        Arc::new(RemoteSpeechEvaluator::new(settings.evaluator.clone()));
    let catalog: Arc<dyn Catalog> = Arc::new(MongoCatalog::new(&db));
    let proficiency: Arc<dyn ProficiencyStore> = Arc::new(MongoProficiencyStore::new(&db));

    let assessments = Arc::new(AssessmentService::new(
        store,
        questions,
        evaluator,
        catalog,
        proficiency.clone(),
        settings.assessment.clone(),
    ));

    let state = AppState {
        settings: settings.clone(),
        assessments,
        proficiency,
    };

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "linguaflow api listening");

    axum::serve(listener, build_router(state))
        .await
        .context("server error")?;
    Ok(())
}
