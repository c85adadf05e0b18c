use std::sync::Arc;

use super::principal::{IdSet, Principal};

static EMPTY_IDS: IdSet = IdSet::new();

/// Identity attached to a single request.
///
/// Holds at most one [`Principal`]. Accessors fall back to safe defaults
/// when the request is anonymous. The value is built once by the
/// authentication gate and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    principal: Option<Arc<Principal>>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(Arc::new(principal)),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.principal().map(|p| p.username.as_str())
    }

    pub fn id(&self) -> Option<i64> {
        self.principal().map(|p| p.id)
    }

    pub fn enabled(&self) -> bool {
        self.principal().is_some_and(|p| p.enabled)
    }

    pub fn is_admin(&self) -> bool {
        self.principal().is_some_and(|p| p.is_admin)
    }

    pub fn roles(&self) -> &IdSet {
        self.principal().map_or(&EMPTY_IDS, |p| &p.roles)
    }

    pub fn modules(&self) -> &IdSet {
        self.principal().map_or(&EMPTY_IDS, |p| &p.modules)
    }

    pub fn submodules(&self) -> &IdSet {
        self.principal().map_or(&EMPTY_IDS, |p| &p.submodules)
    }
}
