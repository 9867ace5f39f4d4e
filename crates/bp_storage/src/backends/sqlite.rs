use async_trait::async_trait;
use bp_core::{
    Article, ArticleFilter, ArticleSort, ArticleStorage, ArticleUpdate, Clock, Error, NewArticle,
    Result, Settings, SettingsStorage, SortField, SortOrder, SystemClock,
};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::StorageBackend;

const DEFAULT_DB_PATH: &str = "articles.db";

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        excerpt TEXT NOT NULL DEFAULT '',
        clean_text TEXT,
        keywords TEXT NOT NULL DEFAULT '[]',
        asset_uri TEXT NOT NULL,
        status TEXT NOT NULL,
        published_at TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_status_created ON articles (status, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS settings (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        publishing_frequency INTEGER NOT NULL,
        keywords TEXT NOT NULL,
        target_url TEXT
    )
    "#,
    // Add future migrations here
];

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |e| Error::Database(format!("{}: {}", context, e))
}

/// Fixed-width UTC timestamps so that text ordering matches time ordering.
fn format_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Failed to parse date '{}': {}", value, e)))
}

fn order_clause(sort: ArticleSort) -> &'static str {
    match (sort.field, sort.order) {
        (SortField::CreatedAt, SortOrder::Asc) => "ORDER BY created_at ASC, rowid ASC",
        (SortField::CreatedAt, SortOrder::Desc) => "ORDER BY created_at DESC, rowid DESC",
        (SortField::PublishedAt, SortOrder::Asc) => {
            "ORDER BY published_at IS NULL, published_at ASC, rowid ASC"
        }
        (SortField::PublishedAt, SortOrder::Desc) => {
            "ORDER BY published_at IS NULL, published_at DESC, rowid DESC"
        }
    }
}

fn article_from_row(row: &SqliteRow) -> Result<Article> {
    let get = |column: &str| -> Result<String> {
        row.try_get::<String, _>(column)
            .map_err(|e| Error::Database(format!("Failed to read column {}: {}", column, e)))
    };
    let keywords: Vec<String> = serde_json::from_str(&get("keywords")?)?;
    let published_at = row
        .try_get::<Option<String>, _>("published_at")
        .map_err(db_error("Failed to read column published_at"))?
        .map(|value| parse_time(&value))
        .transpose()?;
    let clean_text = row
        .try_get::<Option<String>, _>("clean_text")
        .map_err(db_error("Failed to read column clean_text"))?;

    Ok(Article {
        id: get("id")?,
        title: get("title")?,
        content: get("content")?,
        excerpt: get("excerpt")?,
        clean_text,
        keywords,
        asset_uri: get("asset_uri")?,
        status: get("status")?.parse()?,
        published_at,
        created_at: parse_time(&get("created_at")?)?,
    })
}

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
    clock: Arc<dyn Clock>,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be available at the configured path (default ./articles.db)"
    }

    async fn connect(url: Option<&str>) -> Result<Self> {
        let path = url
            .map(|url| url.trim_start_matches("sqlite://").trim_start_matches("sqlite:"))
            .unwrap_or(DEFAULT_DB_PATH);
        Self::new_with_path(Path::new(path)).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(db_error("Failed to connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }
        tracing::debug!("SQLite storage ready at {}", db_path.display());

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    async fn write(&self, article: &Article) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE articles SET
                title = ?, content = ?, excerpt = ?, keywords = ?, status = ?, published_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.excerpt)
        .bind(serde_json::to_string(&article.keywords)?)
        .bind(article.status.as_str())
        .bind(article.published_at.map(format_time))
        .bind(&article.id)
        .execute(&*self.pool)
        .await
        .map_err(db_error("Failed to update article"))?;
        Ok(())
    }
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn find(&self, filter: &ArticleFilter, sort: ArticleSort) -> Result<Vec<Article>> {
        let mut sql = String::from("SELECT * FROM articles");
        if let Some(statuses) = &filter.statuses {
            if statuses.is_empty() {
                return Ok(Vec::new());
            }
            let placeholders = vec!["?"; statuses.len()].join(", ");
            sql.push_str(&format!(" WHERE status IN ({})", placeholders));
        }
        sql.push(' ');
        sql.push_str(order_clause(sort));
        if filter.limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut query = sqlx::query(&sql);
        for status in filter.statuses.iter().flatten() {
            query = query.bind(status.as_str());
        }
        if let Some(limit) = filter.limit {
            query = query.bind(limit as i64);
        }

        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(db_error("Failed to find articles"))?;
        rows.iter().map(article_from_row).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<Article>> {
        let row = sqlx::query("SELECT * FROM articles WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error("Failed to get article"))?;
        row.as_ref().map(article_from_row).transpose()
    }

    async fn create(&self, article: NewArticle) -> Result<Article> {
        let article = Article::from_new(Uuid::new_v4().to_string(), article, self.clock.now());
        sqlx::query(
            r#"
            INSERT INTO articles
            (id, title, content, excerpt, clean_text, keywords, asset_uri, status, published_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.id)
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.excerpt)
        .bind(article.clean_text.as_deref())
        .bind(serde_json::to_string(&article.keywords)?)
        .bind(&article.asset_uri)
        .bind(article.status.as_str())
        .bind(article.published_at.map(format_time))
        .bind(format_time(article.created_at))
        .execute(&*self.pool)
        .await
        .map_err(db_error("Failed to store article"))?;
        Ok(article)
    }

    async fn update_by_id(&self, id: &str, update: ArticleUpdate) -> Result<Option<Article>> {
        let Some(mut article) = self.get(id).await? else {
            return Ok(None);
        };
        article.apply(update);
        self.write(&article).await?;
        Ok(Some(article))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(db_error("Failed to delete article"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SettingsStorage for SQLiteStorage {
    async fn load_settings(&self) -> Result<Option<Settings>> {
        let row = sqlx::query("SELECT publishing_frequency, keywords, target_url FROM settings WHERE id = 1")
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error("Failed to load settings"))?;
        let Some(row) = row else {
            return Ok(None);
        };

        let frequency: i64 = row
            .try_get("publishing_frequency")
            .map_err(db_error("Failed to read column publishing_frequency"))?;
        let keywords: String = row
            .try_get("keywords")
            .map_err(db_error("Failed to read column keywords"))?;
        let target_url: Option<String> = row
            .try_get("target_url")
            .map_err(db_error("Failed to read column target_url"))?;

        Ok(Some(Settings {
            publishing_frequency: u32::try_from(frequency)
                .map_err(|_| Error::Database(format!("Invalid publishing frequency {}", frequency)))?,
            keywords: serde_json::from_str(&keywords)?,
            target_url,
        }))
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO settings (id, publishing_frequency, keywords, target_url)
            VALUES (1, ?, ?, ?)
            "#,
        )
        .bind(settings.publishing_frequency as i64)
        .bind(serde_json::to_string(&settings.keywords)?)
        .bind(settings.target_url.as_deref())
        .execute(&*self.pool)
        .await
        .map_err(db_error("Failed to save settings"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bp_core::{ArticleStatus, ManualClock};
    use chrono::Duration;
    use tempfile::tempdir;

    fn new_article(title: &str) -> NewArticle {
        NewArticle {
            title: title.to_string(),
            content: format!("<h1>{}</h1>", title),
            excerpt: format!("About {}", title),
            clean_text: Some(title.to_string()),
            keywords: vec![title.to_lowercase()],
            asset_uri: format!("https://img.example.com/{}.png", title.to_lowercase()),
            status: ArticleStatus::Scheduled,
        }
    }

    #[tokio::test]
    async fn test_sqlite_storage() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");
        let start = Utc::now();
        let clock = Arc::new(ManualClock::new(start));
        let storage = SQLiteStorage::new_with_path(&db_path).await.unwrap().with_clock(clock.clone());

        let first = storage.create(new_article("First")).await.unwrap();
        clock.advance(Duration::minutes(1));
        let second = storage.create(new_article("Second")).await.unwrap();

        let fetched = storage.get(&first.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "First");
        assert_eq!(fetched.clean_text.as_deref(), Some("First"));
        assert_eq!(fetched.asset_uri, "https://img.example.com/first.png");
        assert_eq!(fetched.status, ArticleStatus::Scheduled);

        let queue = storage
            .find(&ArticleFilter::with_statuses(&[ArticleStatus::Scheduled]), ArticleSort::oldest_first())
            .await
            .unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].id, first.id);

        let published_at = start + Duration::minutes(2);
        let updated = storage
            .update_by_id(&second.id, ArticleUpdate::publish(ArticleStatus::Published, published_at))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, ArticleStatus::Published);

        let latest = storage
            .find(&ArticleFilter::all().limit(1), ArticleSort::latest_published())
            .await
            .unwrap();
        assert_eq!(latest[0].id, second.id);
        assert_eq!(latest[0].published_at, Some(published_at));

        assert!(storage.update_by_id("missing", ArticleUpdate::default()).await.unwrap().is_none());
        assert!(storage.delete_by_id(&first.id).await.unwrap());
        assert!(!storage.delete_by_id(&first.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_sqlite_settings() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("settings.db")).await.unwrap();
        assert!(storage.load_settings().await.unwrap().is_none());

        let settings = Settings {
            publishing_frequency: 30,
            keywords: vec!["rust".into()],
            target_url: Some("https://target.example.com/api/publish".into()),
        };
        storage.save_settings(&settings).await.unwrap();
        storage.save_settings(&settings).await.unwrap();
        assert_eq!(storage.load_settings().await.unwrap(), Some(settings));
    }
}
