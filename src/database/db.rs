use log::info;
use mongodb::bson::{Document, doc};
use mongodb::options::{ClientOptions, Collation, CollationStrength, IndexOptions};
use mongodb::{Client, Database as MongoDatabase, IndexModel};

use crate::user::model::User;
use crate::utils::error::CustomError;
use crate::utils::hashing;

pub struct Database {
    pub client: Client,
}

impl Database {
    pub async fn init() -> Result<Self, CustomError> {
        let mongodb_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let mut client_options = ClientOptions::parse(&mongodb_uri)
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Invalid MongoDB URI: {}", e)))?;
        client_options.app_name = Some("blog-api".to_string());

        let client = Client::with_options(client_options)
            .map_err(|e| CustomError::InternalServerError(format!("MongoDB client error: {}", e)))?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| CustomError::InternalServerError(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB");

        Ok(Self { client })
    }
}

pub fn blog_database(client: &Client) -> MongoDatabase {
    let name = std::env::var("MONGODB_DB").unwrap_or_else(|_| "blog".to_string());
    client.database(&name)
}

pub async fn ensure_indexes(client: &Client) -> Result<(), CustomError> {
    let posts = blog_database(client).collection::<Document>("posts");

    let text_index = IndexModel::builder()
        .keys(doc! { "published.text": "text" })
        .options(
            IndexOptions::builder()
                .name("published_text".to_string())
                .default_language("english".to_string())
                .build(),
        )
        .build();

    let created_index = IndexModel::builder()
        .keys(doc! { "createdAt": -1 })
        .options(IndexOptions::builder().name("created_at".to_string()).build())
        .build();

    let tags_index = IndexModel::builder()
        .keys(doc! { "published.tags": -1 })
        .options(
            IndexOptions::builder()
                .name("published_tags".to_string())
                .collation(
                    Collation::builder()
                        .locale("en")
                        .strength(CollationStrength::Secondary)
                        .build(),
                )
                .build(),
        )
        .build();

    posts
        .create_indexes(vec![text_index, created_index, tags_index])
        .await
        .map_err(|e| CustomError::InternalServerError(format!("Failed to create indexes: {}", e)))?;

    Ok(())
}

/// Seeds the admin account from the environment when the users
/// collection is empty, so a fresh deployment can be logged into.
pub async fn ensure_admin_user(client: &Client) -> Result<(), CustomError> {
    let users = blog_database(client).collection::<User>("users");

    let existing = users
        .find_one(doc! {})
        .await
        .map_err(|e| CustomError::InternalServerError(format!("Failed to query users: {}", e)))?;
    if existing.is_some() {
        return Ok(());
    }

    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let password = std::env::var("ADMIN_PASSWORD")
        .map_err(|_| CustomError::InternalServerError("ADMIN_PASSWORD is required on first run".to_string()))?;

    let user = User::new(username.clone(), hashing::hash_password(&password)?);
    users
        .insert_one(user)
        .await
        .map_err(|e| CustomError::InternalServerError(format!("Failed to seed admin user: {}", e)))?;

    info!("Seeded admin user {}", username);
    Ok(())
}

pub async fn connect_to_mongo() -> Result<Client, CustomError> {
    let database = Database::init().await?;
    Ok(database.client)
}
