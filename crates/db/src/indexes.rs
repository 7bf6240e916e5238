use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Languages
    create_indexes(
        db,
        "languages",
        vec![
            index_unique(bson::doc! { "code": 1 }),
            index(bson::doc! { "is_active": 1 }),
        ],
    )
    .await?;

    // Programs
    create_indexes(
        db,
        "programs",
        vec![
            index(bson::doc! { "language_id": 1, "position": 1 }),
            index_unique(bson::doc! { "language_id": 1, "name": 1 }),
        ],
    )
    .await?;

    // Courses
    create_indexes(
        db,
        "courses",
        vec![
            index(bson::doc! { "language_id": 1, "level": 1, "position": 1 }),
            index(bson::doc! { "language_id": 1, "is_published": 1 }),
        ],
    )
    .await?;

    // Proficiency records: one committed level per learner+language
    create_indexes(
        db,
        "proficiency_records",
        vec![
            index_unique(bson::doc! { "user_id": 1, "language_id": 1 }),
            index(bson::doc! { "language_id": 1, "level": 1 }),
        ],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    let coll = db.collection::<bson::Document>(collection);
    match coll.create_indexes(indexes.clone()).await {
        Ok(_) => {
            info!(collection, "Indexes created");
            Ok(())
        }
        Err(e) => {
            // IndexKeySpecsConflict (code 86): an existing index has the same name
            // but different options. Drop the conflicting index and retry.
            if let mongodb::error::ErrorKind::Command(ref cmd_err) = *e.kind {
                if cmd_err.code == 86 {
                    tracing::warn!(
                        collection,
                        "Index conflict detected, dropping conflicting indexes and retrying"
                    );
                    coll.drop_indexes().await?;
                    coll.create_indexes(indexes).await?;
                    info!(collection, "Indexes recreated after conflict resolution");
                    return Ok(());
                }
            }
            Err(e)
        }
    }
}
