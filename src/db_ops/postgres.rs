use super::{project, DocumentStore, Filter, StoreResult};
use crate::models::{self, DocId, Document};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    query,
    types::Json,
    FromRow, Postgres, QueryBuilder,
};
use uuid::Uuid;

/// Every collection lives in this one table; `seq` gives the natural
/// (insertion) order and `data` holds the document without its `_id`.
const CREATE_TABLE: &str = "
    create table if not exists documents (
        seq bigserial primary key,
        id uuid not null unique,
        collection text not null,
        data jsonb not null
    )";

#[derive(FromRow)]
struct DocRow {
    id: Uuid,
    data: Json<Document>,
}

impl DocRow {
    fn into_document(self) -> Document {
        let Json(mut doc) = self.data;
        doc.insert(
            models::ID.to_string(),
            Value::String(DocId::from(self.id).to_string()),
        );
        doc
    }
}

pub struct PgStore {
    db: PgPool,
    collection: String,
}

impl PgStore {
    pub async fn connect(url: &str, collection: &str) -> StoreResult<Self> {
        let db = PgPoolOptions::new()
            .max_connections(20)
            .connect(url)
            .await?;
        query(CREATE_TABLE).execute(&db).await?;

        Ok(PgStore {
            db,
            collection: collection.to_string(),
        })
    }

    /// Appends the `where` clause selecting `filter` within this collection.
    fn push_filter(
        &self,
        qb: &mut QueryBuilder<'_, Postgres>,
        filter: &Filter,
    ) {
        qb.push(" where collection = ");
        qb.push_bind(self.collection.clone());
        if let Some(id) = filter.id {
            qb.push(" and id = ");
            qb.push_bind(id.as_uuid());
        }
        if !filter.equals.is_empty() {
            let expected: Map<String, Value> = filter
                .equals
                .iter()
                .map(|(field, value)| (field.to_string(), value.clone()))
                .collect();
            qb.push(" and data @> ");
            qb.push_bind(Json(Value::Object(expected)));
        }
        for field in &filter.exists {
            qb.push(" and jsonb_exists(data, ");
            qb.push_bind(field.to_string());
            qb.push(")");
        }
    }

    /// `update ... where seq = (<this>)` touches at most the first match.
    fn push_first_match(
        &self,
        qb: &mut QueryBuilder<'_, Postgres>,
        filter: &Filter,
    ) {
        qb.push(" where seq = (select seq from documents");
        self.push_filter(qb, filter);
        qb.push(" order by seq limit 1)");
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<Document>> {
        let mut qb = QueryBuilder::new("select id, data from documents");
        self.push_filter(&mut qb, filter);
        qb.push(" order by seq limit 1");
        let row = qb
            .build_query_as::<DocRow>()
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(DocRow::into_document))
    }

    async fn find(
        &self,
        filter: &Filter,
        projection: &[&str],
    ) -> StoreResult<Vec<Document>> {
        let mut qb = QueryBuilder::new("select id, data from documents");
        self.push_filter(&mut qb, filter);
        qb.push(" order by seq");
        let rows = qb.build_query_as::<DocRow>().fetch_all(&self.db).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let doc = row.into_document();
                if projection.is_empty() {
                    doc
                } else {
                    project(&doc, projection)
                }
            })
            .collect())
    }

    async fn insert_one(&self, mut doc: Document) -> StoreResult<DocId> {
        let id = DocId::generate();
        doc.remove(models::ID);
        query(
            "insert into documents (id, collection, data) values ($1, $2, $3)",
        )
        .bind(id.as_uuid())
        .bind(&self.collection)
        .bind(Json(doc))
        .execute(&self.db)
        .await?;

        Ok(id)
    }

    async fn update_one(
        &self,
        filter: &Filter,
        mut set: Document,
    ) -> StoreResult<u64> {
        set.remove(models::ID);
        let mut qb = QueryBuilder::new("update documents set data = data || ");
        qb.push_bind(Json(set));
        self.push_first_match(&mut qb, filter);
        let res = qb.build().execute(&self.db).await?;

        Ok(res.rows_affected())
    }

    async fn delete_one(&self, filter: &Filter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::new("delete from documents");
        self.push_first_match(&mut qb, filter);
        let res = qb.build().execute(&self.db).await?;

        Ok(res.rows_affected())
    }
}
