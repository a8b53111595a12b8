//! Generation options.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Frontend framework the reactive bindings target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    #[default]
    Vanilla,
    React,
    Nextjs,
    Vue,
    Svelte,
}

impl Framework {
    /// TanStack Query adapter package, if the framework has one.
    pub fn query_package(self) -> Option<&'static str> {
        match self {
            Framework::Vanilla => None,
            Framework::React | Framework::Nextjs => Some("@tanstack/react-query"),
            Framework::Vue => Some("@tanstack/vue-query"),
            Framework::Svelte => Some("@tanstack/svelte-query"),
        }
    }

    /// (query, mutation) factory names exported by the adapter.
    pub fn query_factories(self) -> (&'static str, &'static str) {
        match self {
            Framework::Svelte => ("createQuery", "createMutation"),
            _ => ("useQuery", "useMutation"),
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Framework::Vanilla => "vanilla",
            Framework::React => "react",
            Framework::Nextjs => "nextjs",
            Framework::Vue => "vue",
            Framework::Svelte => "svelte",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// zod schemas, and request validation in client functions.
    pub validation: bool,
    /// Query/mutation hooks.
    pub bindings: bool,
    /// Server-only wrappers around the client functions.
    pub server_variants: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            validation: true,
            bindings: true,
            server_variants: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    pub framework: Framework,
    pub features: Features,
    /// Baked into `client.ts`; empty means same-origin.
    pub base_url: String,
}

impl GenerateOptions {
    /// Bindings need a framework with a query adapter.
    pub fn emits_bindings(&self) -> bool {
        self.features.bindings && self.framework.query_package().is_some()
    }
}
