// src/pipeline/generator.rs

//! Consent flow orchestration.
//!
//! The flow is: build choices from the stored state, hand them to the UI,
//! and once the UI reports a decision, reconcile, encode and persist.
//! The choice bundle is moved into the UI and moved back on submission;
//! when the user dismisses the UI nothing is parsed or stored.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChoicesBridgeDto, Config, TcModel};
use crate::pipeline::context::{ConsentContext, StoredConsent, load_sources};
use crate::services::{
    ChoiceBridgeBuilder, ChoicesParser, ConsentStringCodec, LegalBasisPolicy, SourceFetcher,
    build_ac_string, encode_or_empty,
};
use crate::storage::{ConsentStorage, get_or_absent, set_or_log};

/// What the user did with the choice screen.
#[derive(Debug, Clone)]
pub enum UserDecision {
    /// Saved the (possibly edited) choices
    Submitted(ChoicesBridgeDto),
    /// Pressed "accept all"
    AcceptAll,
    /// Closed the screen without deciding
    Dismissed,
}

/// The consent UI.
#[async_trait]
pub trait ChoicesRenderer: Send + Sync {
    /// Show the choices and wait for the user's decision.
    async fn present(&self, choices: ChoicesBridgeDto) -> Result<UserDecision>;
}

/// Strings produced by a completed flow. Empty when encoding failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsentStrings {
    pub tc: String,
    pub ac: String,
}

/// Drives consent flows for one publisher configuration.
pub struct ConsentGenerator {
    config: Arc<Config>,
    codec: Arc<dyn ConsentStringCodec>,
    storage: Arc<dyn ConsentStorage>,
}

impl ConsentGenerator {
    pub fn new(
        config: Arc<Config>,
        codec: Arc<dyn ConsentStringCodec>,
        storage: Arc<dyn ConsentStorage>,
    ) -> Self {
        Self {
            config,
            codec,
            storage,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read both consent strings. Storage failures read as absent.
    pub async fn stored(&self) -> StoredConsent {
        StoredConsent {
            tc: get_or_absent(self.storage.as_ref(), &self.config.storage.tc_key).await,
            ac: get_or_absent(self.storage.as_ref(), &self.config.storage.ac_key).await,
        }
    }

    /// Whether the choice screen has to be shown.
    pub async fn needs_consent(&self) -> bool {
        !self.stored().await.is_complete()
    }

    /// Load the vendor lists and restore the stored consent state.
    pub async fn prepare(&self, fetcher: &dyn SourceFetcher) -> Result<ConsentContext> {
        let stored = self.stored().await;
        let sources = load_sources(&self.config, fetcher, stored.ac()).await?;

        let decoded = stored.tc().and_then(|encoded| {
            self.codec
                .decode(encoded, Arc::clone(&sources.gvl))
                .map_err(|e| log::warn!("Ignoring stored TC string: {}", e))
                .ok()
        });

        Ok(match decoded {
            Some(tc_model) => ConsentContext::new(tc_model, sources.ac_model, false),
            None => ConsentContext::fresh(&self.config, sources),
        })
    }

    fn policy(&self, ctx: &ConsentContext) -> LegalBasisPolicy {
        LegalBasisPolicy::resolve(self.config.policy.flags(ctx.first_time))
    }

    /// Build the choice bundle for the UI.
    pub fn build_choices(&self, ctx: &ConsentContext) -> Result<ChoicesBridgeDto> {
        ChoiceBridgeBuilder::with_policy(&ctx.tc_model, &ctx.ac_model, self.policy(ctx)).build()
    }

    /// Apply the user's submitted choices.
    pub async fn submit(&self, ctx: &mut ConsentContext, dto: &ChoicesBridgeDto) -> ConsentStrings {
        let policy = self.policy(ctx);
        let source = ctx.tc_model.clone();
        let mut parser = ChoicesParser::with_policy(&source, &mut ctx.ac_model, policy);
        let tc_model = parser.parse_tc_model(dto);
        parser.parse_ac_model(dto);

        log::info!("Consent submitted");
        self.commit(ctx, tc_model).await
    }

    /// Enable everything.
    pub async fn accept_all(&self, ctx: &mut ConsentContext) -> ConsentStrings {
        let policy = self.policy(ctx);
        let source = ctx.tc_model.clone();
        let mut parser = ChoicesParser::with_policy(&source, &mut ctx.ac_model, policy);
        let tc_model = parser.build_tc_model_all_enabled();
        parser.build_ac_model_all_enabled();

        log::info!("All consent accepted");
        self.commit(ctx, tc_model).await
    }

    /// Show the UI when consent is required and apply the decision.
    ///
    /// Returns `None` when stored consent is complete or the user
    /// dismissed the UI.
    pub async fn run(
        &self,
        ctx: &mut ConsentContext,
        renderer: &dyn ChoicesRenderer,
    ) -> Result<Option<ConsentStrings>> {
        if !self.needs_consent().await {
            log::debug!("Stored consent is complete, not showing the choice screen");
            return Ok(None);
        }

        let choices = self.build_choices(ctx)?;
        match renderer.present(choices).await? {
            UserDecision::Submitted(dto) => Ok(Some(self.submit(ctx, &dto).await)),
            UserDecision::AcceptAll => Ok(Some(self.accept_all(ctx).await)),
            UserDecision::Dismissed => {
                log::info!("Choice screen dismissed, consent still required");
                Ok(None)
            }
        }
    }

    async fn commit(&self, ctx: &mut ConsentContext, tc_model: TcModel) -> ConsentStrings {
        let strings = ConsentStrings {
            tc: encode_or_empty(self.codec.as_ref(), &tc_model),
            ac: build_ac_string(&ctx.ac_model),
        };

        let storage = self.storage.as_ref();
        set_or_log(storage, &self.config.storage.tc_key, &strings.tc).await;
        set_or_log(storage, &self.config.storage.ac_key, &strings.ac).await;

        ctx.tc_model = tc_model;
        ctx.first_time = false;
        strings
    }
}
