use crate::domain::model::{RowError, RowErrorKind, SiteId};
use crate::domain::ports::TopicCapability;
use std::sync::Arc;

pub struct TopicAssigner {
    topics: Arc<dyn TopicCapability>,
}

impl TopicAssigner {
    pub fn new(topics: Arc<dyn TopicCapability>) -> Self {
        Self { topics }
    }

    /// Failures come back as `no_blog_topic` warnings; the site is left as created.
    pub fn assign_topic(&self, line: usize, site: SiteId, topic_name: &str) -> Result<(), RowError> {
        let topic = match self.topics.find_topic(topic_name) {
            Ok(Some(topic)) => topic,
            Ok(None) => {
                return Err(RowError::new(
                    RowErrorKind::NoBlogTopic,
                    line,
                    format!("topic \"{}\" does not exist, site #{} created without a topic", topic_name, site),
                ));
            }
            Err(e) => {
                return Err(RowError::new(
                    RowErrorKind::NoBlogTopic,
                    line,
                    format!("topic lookup for \"{}\" failed: {}", topic_name, e),
                ));
            }
        };

        self.topics.set_site_topic(site, topic).map_err(|e| {
            RowError::new(
                RowErrorKind::NoBlogTopic,
                line,
                format!("could not assign topic \"{}\" to site #{}: {}", topic_name, site, e),
            )
        })?;

        tracing::debug!("Line {}: site #{} assigned to topic \"{}\"", line, site, topic_name);
        Ok(())
    }
}
