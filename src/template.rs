//! Template blueprints and the process-wide template cache.
//!
//! Every descriptor type is backed by a visual template. A template is resolved
//! once per `(template, origin)` pair through a [`TemplateLoader`] and kept as a
//! [`Blueprint`]; each time a descriptor needs a view the blueprint
//! instantiates a fresh [`View`] bound to it.
//!
//! Descriptors created as *pinned* keep the first view they were given and get
//! that same instance back on every later request instead of a new one.
//!
//! # Basic Usage
//!
//! ```rust
//! use bubbletea_tableview::template::{Blueprint, TemplateCache, TemplateKey, TemplateRegistry};
//! use lipgloss_extras::prelude::*;
//!
//! let registry = TemplateRegistry::new()
//!     .with_template("app::TaskRow", None, Blueprint::new(Style::new().bold(true)));
//! let cache = TemplateCache::new(registry);
//!
//! let key = TemplateKey::new("app::TaskRow", None);
//! assert!(cache.blueprint(&key).is_ok());
//! assert_eq!(cache.loads(), 1);
//! ```

use crate::error::TemplateError;
use lipgloss_extras::prelude::*;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

static LAST_VIEW_ID: AtomicU64 = AtomicU64::new(0);

fn next_view_id() -> u64 {
    LAST_VIEW_ID.fetch_add(1, Ordering::SeqCst) + 1
}

static SHARED: OnceCell<Arc<TemplateCache>> = OnceCell::new();

/// Identifies a template: the reuse key of a descriptor type plus the origin
/// namespace (bundle) it is loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateKey {
    /// Reuse key, usually the descriptor's controller type name.
    pub template: String,
    /// Origin namespace; `None` selects the default namespace.
    pub origin: Option<String>,
}

impl TemplateKey {
    /// Creates a key from a template name and optional origin.
    pub fn new(template: impl Into<String>, origin: Option<&str>) -> Self {
        Self {
            template: template.into(),
            origin: origin.map(str::to_string),
        }
    }
}

/// A loaded template definition from which views are instantiated.
#[derive(Debug, Clone)]
pub struct Blueprint {
    style: Style,
    height: Option<usize>,
}

impl Blueprint {
    /// Creates a blueprint that renders content with `style`.
    pub fn new(style: Style) -> Self {
        Self {
            style,
            height: None,
        }
    }

    /// Fixes the height, in lines, of every view built from this blueprint.
    pub fn with_height(mut self, height: usize) -> Self {
        self.height = Some(height);
        self
    }

    /// The style applied to rendered content.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Fixed height, if the blueprint declares one.
    pub fn height(&self) -> Option<usize> {
        self.height
    }

    /// Creates a new view instance from this blueprint.
    pub fn instantiate(&self, key: &TemplateKey, persisted: bool) -> Arc<View> {
        Arc::new(View {
            id: next_view_id(),
            key: key.clone(),
            style: self.style.clone(),
            height: self.height,
            persisted,
        })
    }
}

/// A view instance bound to one descriptor.
#[derive(Debug)]
pub struct View {
    id: u64,
    key: TemplateKey,
    style: Style,
    height: Option<usize>,
    persisted: bool,
}

impl View {
    /// Unique id of this instance.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Template this view was instantiated from.
    pub fn template(&self) -> &TemplateKey {
        &self.key
    }

    /// Style inherited from the blueprint.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Fixed height inherited from the blueprint.
    pub fn height(&self) -> Option<usize> {
        self.height
    }

    /// True for views retained by a pinned descriptor.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Renders `content` with the view's style.
    pub fn render(&self, content: &str) -> String {
        self.style.render(content)
    }
}

/// Resolves templates for the cache. Implemented by the host.
pub trait TemplateLoader: Send + Sync {
    /// Loads the blueprint for `key`, or `None` if no such template exists.
    fn load(&self, key: &TemplateKey) -> Option<Blueprint>;
}

/// In-memory [`TemplateLoader`] populated up front by the host.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<TemplateKey, Blueprint>,
}

impl TemplateRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a blueprint, builder style.
    pub fn with_template(
        mut self,
        template: impl Into<String>,
        origin: Option<&str>,
        blueprint: Blueprint,
    ) -> Self {
        self.register(template, origin, blueprint);
        self
    }

    /// Registers a blueprint, replacing any previous one for the same key.
    pub fn register(
        &mut self,
        template: impl Into<String>,
        origin: Option<&str>,
        blueprint: Blueprint,
    ) {
        self.templates
            .insert(TemplateKey::new(template, origin), blueprint);
    }
}

impl TemplateLoader for TemplateRegistry {
    fn load(&self, key: &TemplateKey) -> Option<Blueprint> {
        self.templates.get(key).cloned()
    }
}

/// The view slots a descriptor carries.
///
/// `bound` holds the view most recently handed to the owner; `pinned` holds the
/// retained instance of a pinned owner.
#[derive(Debug, Default)]
pub struct ViewSlot {
    bound: Mutex<Option<Arc<View>>>,
    pinned: Mutex<Option<Arc<View>>>,
}

impl ViewSlot {
    /// Currently bound view, if any.
    pub fn bound(&self) -> Option<Arc<View>> {
        self.bound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clears the bound view.
    pub fn unbind(&self) {
        *self.bound.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn bind(&self, view: Arc<View>) {
        *self.bound.lock().unwrap_or_else(PoisonError::into_inner) = Some(view);
    }

    fn pinned(&self) -> Option<Arc<View>> {
        self.pinned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn pin(&self, view: Arc<View>) {
        *self.pinned.lock().unwrap_or_else(PoisonError::into_inner) = Some(view);
    }
}

/// Anything that can own a bound view: row and group descriptors.
pub trait ViewOwner {
    /// The owner's view slots.
    fn view_slot(&self) -> &ViewSlot;

    /// Whether the owner keeps a single persistent view.
    fn is_pinned(&self) -> bool {
        false
    }
}

/// Lazily populated store of blueprints keyed by [`TemplateKey`].
///
/// Entries are never evicted. The load-miss path runs under the entry lock, so
/// two simultaneous first requests for one key load the blueprint once.
pub struct TemplateCache {
    loader: Box<dyn TemplateLoader>,
    entries: Mutex<HashMap<TemplateKey, Arc<Blueprint>>>,
    loads: AtomicUsize,
}

impl std::fmt::Debug for TemplateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateCache")
            .field("entries", &self.len())
            .field("loads", &self.loads())
            .finish()
    }
}

impl TemplateCache {
    /// Creates an empty cache backed by `loader`.
    pub fn new(loader: impl TemplateLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            entries: Mutex::new(HashMap::new()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Installs the process-wide cache, or returns the one already installed.
    ///
    /// Only the first call's loader is used.
    pub fn install_shared(loader: impl TemplateLoader + 'static) -> Arc<Self> {
        let mut installed = false;
        let cache = SHARED.get_or_init(|| {
            installed = true;
            Arc::new(Self::new(loader))
        });
        if !installed {
            tracing::warn!("shared template cache already installed; new loader ignored");
        }
        Arc::clone(cache)
    }

    /// The process-wide cache, if one was installed.
    pub fn shared() -> Option<Arc<Self>> {
        SHARED.get().cloned()
    }

    /// Number of cached blueprints.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times the loader has been consulted successfully.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Returns the cached blueprint for `key`, loading it on first use.
    pub fn blueprint(&self, key: &TemplateKey) -> Result<Arc<Blueprint>, TemplateError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(blueprint) = entries.get(key) {
            return Ok(Arc::clone(blueprint));
        }

        let Some(blueprint) = self.loader.load(key) else {
            tracing::error!(
                template = %key.template,
                origin = ?key.origin,
                "template not found"
            );
            return Err(TemplateError::NotFound {
                template: key.template.clone(),
                origin: key.origin.clone(),
            });
        };

        tracing::debug!(template = %key.template, origin = ?key.origin, "template loaded");
        self.loads.fetch_add(1, Ordering::SeqCst);
        let blueprint = Arc::new(blueprint);
        entries.insert(key.clone(), Arc::clone(&blueprint));
        Ok(blueprint)
    }

    /// Returns a view bound to `owner`.
    ///
    /// Non-pinned owners get a fresh instance on every call. A pinned owner
    /// gets a fresh instance the first time and that same instance afterwards.
    /// Either way the returned view is stored in the owner's bound slot.
    pub fn load_or_get<O>(&self, key: &TemplateKey, owner: &O) -> Result<Arc<View>, TemplateError>
    where
        O: ViewOwner + ?Sized,
    {
        let slot = owner.view_slot();
        let pinned = owner.is_pinned();

        if pinned {
            if let Some(view) = slot.pinned() {
                slot.bind(Arc::clone(&view));
                return Ok(view);
            }
        }

        let view = self.blueprint(key)?.instantiate(key, pinned);
        if pinned {
            slot.pin(Arc::clone(&view));
        }
        slot.bind(Arc::clone(&view));
        Ok(view)
    }
}
