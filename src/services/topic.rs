use crate::{
    error::Result,
    models::{faq::Faq, topic::Topic},
    services::Database,
};
use std::sync::Arc;
use tracing::debug;

/// 话题与 FAQ 这类只读目录数据
#[derive(Clone)]
pub struct TopicService {
    db: Arc<Database>,
}

impl TopicService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    pub async fn list_topics(&self) -> Result<Vec<Topic>> {
        debug!("Fetching active topics");
        let mut topics: Vec<Topic> = self
            .db
            .list_topics()
            .await?
            .into_iter()
            .filter(|t| t.is_active)
            .collect();
        topics.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(topics)
    }

    pub async fn list_faqs(&self) -> Result<Vec<Faq>> {
        let mut faqs = self.db.list_faqs().await?;
        faqs.sort_by_key(|f| f.id);
        Ok(faqs)
    }
}
