//! `AstroService`: the request pipelines behind `/process` and `/process_message`.

use crate::chart::{AnalyticEphemeris, ChartCalculator, ChartResult, Ephemeris, TzfTimezoneLookup};
use crate::chat::ChatResponder;
use crate::config::{AppConfig, EphemerisBackend, TraitModel};
use crate::error::{AstroError, AstroResult};
use crate::location::LocationResolver;
use crate::personality::{FixedTraitScorer, RegressionTraitScorer, TraitScorer, TRAITS_PLACEHOLDER};
use crate::session::{SessionChart, SessionStore};
use crate::validation::{validate, BirthDetailsRequest};
use std::sync::Arc;

pub struct AstroService {
    resolver: LocationResolver,
    calculator: ChartCalculator,
    scorer: Arc<dyn TraitScorer>,
    sessions: SessionStore,
    responder: ChatResponder,
}

impl AstroService {
    pub fn new(resolver: LocationResolver, calculator: ChartCalculator, scorer: Arc<dyn TraitScorer>) -> Self {
        Self {
            resolver,
            calculator,
            scorer,
            sessions: SessionStore::new(),
            responder: ChatResponder::new(),
        }
    }

    /// Wires the production collaborators described by `config`.
    pub fn from_config(config: &AppConfig) -> AstroResult<Self> {
        let resolver = LocationResolver::from_config(&config.geocoder)
            .map_err(|e| AstroError::Internal(format!("geocoder client: {e}")))?;

        let ephemeris: Arc<dyn Ephemeris> = match config.ephemeris.backend {
            EphemerisBackend::Analytic => Arc::new(AnalyticEphemeris),
            #[cfg(feature = "swiss-ephemeris")]
            EphemerisBackend::Swiss => Arc::new(crate::chart::SwissEphemeris::new(&config.ephemeris.path)?),
            #[cfg(not(feature = "swiss-ephemeris"))]
            EphemerisBackend::Swiss => {
                return Err(AstroError::Internal(
                    "ephemeris backend 'swiss' requires the swiss-ephemeris feature".to_string(),
                ))
            }
        };
        let calculator = ChartCalculator::new(Arc::new(TzfTimezoneLookup::new()), ephemeris);

        let scorer: Arc<dyn TraitScorer> = match config.traits.model {
            TraitModel::Fixed => Arc::new(FixedTraitScorer::default()),
            TraitModel::Regression => Arc::new(RegressionTraitScorer::default()),
        };

        tracing::info!(
            target: "zodiac::chart",
            backend = calculator.ephemeris_name(),
            traits = ?config.traits.model,
            session_capacity = config.sessions.capacity,
            "astro service ready"
        );
        Ok(Self::new(resolver, calculator, scorer)
            .with_sessions(SessionStore::with_capacity(config.sessions.capacity)))
    }

    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    /// Validate, resolve, compute, score and store. `session` wins over the body's `session_id`.
    pub async fn process(&self, req: &BirthDetailsRequest, session: Option<&str>) -> AstroResult<ChartResult> {
        let session = session.or(req.session_id.as_deref());
        let result = self.run_pipeline(req, session).await;
        if let Err(e) = &result {
            let kind = e.kind();
            match e {
                AstroError::MissingFields(_) | AstroError::InvalidFormat { .. } | AstroError::PlaceNotFound(_) => {
                    tracing::warn!(kind, error = %e, request = ?req, "birth details rejected");
                }
                _ => tracing::error!(kind, error = %e, request = ?req, "chart processing failed"),
            }
        }
        result
    }

    async fn run_pipeline(&self, req: &BirthDetailsRequest, session: Option<&str>) -> AstroResult<ChartResult> {
        let query = validate(req)?;
        let location = self.resolver.resolve(&query.place).await?;
        let chart = self.calculator.compute(&query, &location)?;

        let traits = match self.scorer.score(&query) {
            Ok(scores) => scores.to_string(),
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, name = %query.name, "trait scoring failed, using placeholder");
                TRAITS_PLACEHOLDER.to_string()
            }
        };
        let chart = chart.with_traits(traits);

        tracing::info!(
            name = %query.name,
            place = %query.place,
            source = ?location.source,
            sun = %chart.sun_sign,
            moon = %chart.moon_sign,
            asc = %chart.ascendant,
            session = %SessionStore::key(session),
            "chart ready"
        );
        self.sessions.put(session, SessionChart::new(&query, &chart));
        Ok(chart)
    }

    /// Chat reply based on the chart stored for `session`.
    pub fn respond(&self, message: &str, session: Option<&str>) -> AstroResult<String> {
        let chart = self.sessions.get(session);
        self.responder.respond(message, chart.as_ref()).inspect_err(|e| {
            tracing::warn!(target: "zodiac::chat", kind = e.kind(), error = %e, %message, "chat message rejected");
        })
    }
}
