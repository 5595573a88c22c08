use super::listen_request;
use super::target;
use super::ListenRequest;
use super::Target;
use super::TargetChange;

impl Target {
    /// Target watching a single document by its full resource name
    pub fn document(
        name: impl Into<String>,
        target_id: i32,
    ) -> Self {
        Self {
            target_id,
            once: false,
            target_type: Some(target::TargetType::Documents(target::DocumentsTarget {
                documents: vec![name.into()],
            })),
            resume_type: None,
        }
    }

    /// Target watching the results of a query
    pub fn query(
        query: target::QueryTarget,
        target_id: i32,
    ) -> Self {
        Self {
            target_id,
            once: false,
            target_type: Some(target::TargetType::Query(query)),
            resume_type: None,
        }
    }

    /// Resume token presented when the stream is reopened
    pub fn resume_token(&self) -> Option<&[u8]> {
        match &self.resume_type {
            Some(target::ResumeType::ResumeToken(token)) => Some(token),
            _ => None,
        }
    }

    pub fn set_resume_token(
        &mut self,
        token: Vec<u8>,
    ) {
        self.resume_type = Some(target::ResumeType::ResumeToken(token));
    }

    pub fn clear_resume_token(&mut self) {
        self.resume_type = None;
    }
}

impl TargetChange {
    /// A change with no target ids applies to every target on the stream
    pub fn applies_to(
        &self,
        target_id: i32,
    ) -> bool {
        self.target_ids.is_empty() || self.target_ids.contains(&target_id)
    }
}

impl ListenRequest {
    /// The single request sent when a listen stream is opened
    pub fn add_target(
        database: impl Into<String>,
        target: Target,
    ) -> Self {
        Self {
            database: database.into(),
            labels: Default::default(),
            target_change: Some(listen_request::TargetChange::AddTarget(target)),
        }
    }
}
