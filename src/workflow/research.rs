//! Audience research: questionnaire, then avatar, diary, brand identity,
//! landing page and marketing kit, each gated on what came before.

use anyhow::Context as _;

use crate::backend::wire::{
    AvatarRequest, BrandRequest, DiaryRequest, LandingPageRequest, MarketingRequest, OfferContext,
};
use crate::backend::{AuthoringBackend, BackendError, RetryPolicy};
use crate::catalog::research::{
    self, AwarenessStage, DiaryPhase, OFFER_QUESTIONS, SAMPLE_ANSWERS,
};
use crate::error::ValidationError;
use crate::research::model::{Avatar, DiaryEntries, MarketingAssets, ResearchSession};
use crate::store::ResearchStore;
use crate::workflow::progress;

/// Records one answer. Unknown question ids are rejected; a blank answer
/// clears the question.
pub fn set_answer(store: &mut ResearchStore, id: &str, value: &str) -> anyhow::Result<()> {
    let question = research::question(id).ok_or_else(|| ValidationError::UnknownCatalogValue {
        kind: "question",
        value: id.to_owned(),
    })?;
    store.update(|s| {
        if value.trim().is_empty() {
            s.answers.remove(question.id);
        } else {
            s.answers.insert(question.id.to_owned(), value.trim().to_owned());
        }
    })
}

/// Fills the questionnaire with the bundled example offer.
pub fn load_sample(store: &mut ResearchStore) -> anyhow::Result<()> {
    store.update(|s| {
        for (id, answer) in SAMPLE_ANSWERS {
            s.answers.insert((*id).to_owned(), (*answer).to_owned());
        }
    })
}

pub fn unanswered(session: &ResearchSession) -> Vec<String> {
    OFFER_QUESTIONS
        .iter()
        .filter(|q| q.required && session.answer(q.id).is_none())
        .map(|q| q.id.to_owned())
        .collect()
}

pub fn ensure_answered(session: &ResearchSession) -> Result<(), ValidationError> {
    let missing = unanswered(session);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::UnansweredQuestions(missing))
    }
}

fn offer_context(session: &ResearchSession) -> OfferContext {
    session
        .answers
        .iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn require_avatar<'a>(
    session: &'a ResearchSession,
    step: &'static str,
) -> Result<&'a Avatar, ValidationError> {
    session
        .problem_aware()
        .ok_or(ValidationError::MissingPrerequisite {
            step,
            needs: "the Problem-Aware avatar",
        })
}

/// Generates the Problem-Aware avatar. Runs under `retry`, which callers
/// normally set to [`RetryPolicy::avatar`]; every failure is retried, whatever
/// its status.
pub async fn generate_avatar(
    store: &mut ResearchStore,
    backend: &dyn AuthoringBackend,
    retry: RetryPolicy,
) -> anyhow::Result<Option<String>> {
    let session = store.session();
    ensure_answered(session)?;
    let retry = retry.retrying_all();

    let request = AvatarRequest {
        prompt: research::build_avatar_prompt(|id| session.answer(id).map(str::to_owned)),
        stage: AwarenessStage::ProblemAware.as_str().to_owned(),
    };
    let generated = progress::track(
        "generate avatar",
        progress::DEFAULT_TICK,
        retry.run("generate avatar", || backend.generate_avatar(&request)),
    )
    .await
    .with_context(|| format!("generate avatar after {} attempt(s)", retry.attempts()))?;

    tracing::info!(name = %generated.avatar.name, "avatar generated");
    let mut avatar = generated.avatar;
    avatar.stage = AwarenessStage::ProblemAware;
    store.update(|s| {
        s.avatars.insert(AwarenessStage::ProblemAware, avatar);
    })?;
    Ok(generated.warning)
}

/// Outcome of the three diary calls.
#[derive(Debug, Clone, PartialEq)]
pub struct DiaryOutcome {
    pub entries: DiaryEntries,
    pub failed: Vec<DiaryPhase>,
}

/// Requests the before/during/after entries one after another.
///
/// A failed entry is left empty and reported in `failed`; the call only errors
/// when every entry fails.
pub async fn generate_diary(
    store: &mut ResearchStore,
    backend: &dyn AuthoringBackend,
    retry: RetryPolicy,
) -> anyhow::Result<DiaryOutcome> {
    let session = store.session();
    let avatar = require_avatar(session, "diary generation")?;
    let context = offer_context(session);

    let mut entries = DiaryEntries::default();
    let mut failed = Vec::new();
    let mut last_error: Option<BackendError> = None;
    for phase in DiaryPhase::ALL {
        let request = DiaryRequest {
            avatar_profile: avatar,
            diary_type: phase.as_str(),
            offer_context: &context,
        };
        match retry
            .run("generate diary entry", || backend.generate_diary_entry(&request))
            .await
        {
            Ok(entry) => {
                tracing::info!(phase = phase.as_str(), chars = entry.len(), "diary entry generated");
                entries.set(phase, entry);
            }
            Err(err) => {
                tracing::warn!(phase = phase.as_str(), error = %err, "diary entry failed");
                failed.push(phase);
                last_error = Some(err);
            }
        }
    }

    if failed.len() == DiaryPhase::ALL.len()
        && let Some(err) = last_error
    {
        return Err(err).context("generate diary entries");
    }

    let saved = entries.clone();
    store.update(|s| s.diary = Some(saved))?;
    Ok(DiaryOutcome { entries, failed })
}

pub async fn generate_brand(
    store: &mut ResearchStore,
    backend: &dyn AuthoringBackend,
    retry: RetryPolicy,
) -> anyhow::Result<()> {
    let session = store.session();
    let avatar = require_avatar(session, "brand identity")?;
    let diary = session.diary.clone().unwrap_or_default();
    let context = offer_context(session);
    let request = BrandRequest {
        problem_aware_avatar: avatar,
        diary_entries: &diary,
        offer_context: &context,
    };

    let brand = progress::track(
        "generate brand identity",
        progress::DEFAULT_TICK,
        retry.run("generate brand identity", || {
            backend.generate_brand_identity(&request)
        }),
    )
    .await
    .context("generate brand identity")?;
    store.update(|s| s.brand_identity = Some(brand))
}

pub async fn generate_landing_page(
    store: &mut ResearchStore,
    backend: &dyn AuthoringBackend,
    retry: RetryPolicy,
) -> anyhow::Result<()> {
    let session = store.session();
    let avatar = require_avatar(session, "landing page")?;
    let brand = session.brand_identity.as_deref().unwrap_or_default();
    let diary = session.diary.clone().unwrap_or_default();
    let context = offer_context(session);
    let request = LandingPageRequest {
        problem_aware_avatar: avatar,
        brand_identity: brand,
        diary_entries: &diary,
        offer_context: &context,
    };

    let spec = progress::track(
        "generate landing page",
        progress::DEFAULT_TICK,
        retry.run("generate landing page", || backend.generate_landing_page(&request)),
    )
    .await
    .context("generate landing page spec")?;
    store.update(|s| s.landing_page_spec = Some(spec))
}

pub async fn generate_marketing(
    store: &mut ResearchStore,
    backend: &dyn AuthoringBackend,
    retry: RetryPolicy,
) -> anyhow::Result<usize> {
    let session = store.session();
    let avatar = require_avatar(session, "marketing assets")?;
    let brand = session
        .brand_identity
        .as_deref()
        .ok_or(ValidationError::MissingPrerequisite {
            step: "marketing assets",
            needs: "the brand identity",
        })?;
    let diary = session.diary.clone().unwrap_or_default();
    let context = offer_context(session);
    let request = MarketingRequest {
        problem_aware_avatar: avatar,
        brand_identity: brand,
        diary_entries: &diary,
        landing_page_spec: session.landing_page_spec.as_deref(),
        offer_context: &context,
    };

    let assets: MarketingAssets = progress::track(
        "generate marketing assets",
        progress::DEFAULT_TICK,
        retry.run("generate marketing assets", || backend.generate_marketing(&request)),
    )
    .await
    .context("generate marketing assets")?;
    let items = assets.total_items();
    store.update(|s| s.marketing_assets = Some(assets))?;
    Ok(items)
}

/// Drops generated results. Answers are kept unless `answers` is set.
pub fn reset(store: &mut ResearchStore, answers: bool) -> anyhow::Result<()> {
    store.update(|s| {
        let kept = if answers {
            Default::default()
        } else {
            std::mem::take(&mut s.answers)
        };
        *s = ResearchSession {
            answers: kept,
            ..ResearchSession::default()
        };
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::backend::scripted::{ScriptedBackend, server_error};
    use crate::backend::wire::{self, GeneratedAvatar};

    fn answered() -> anyhow::Result<ResearchStore> {
        let mut store = ResearchStore::in_memory();
        load_sample(&mut store)?;
        Ok(store)
    }

    fn avatar() -> Avatar {
        Avatar {
            name: "Maria".to_owned(),
            tagline: "Paying an agency for nothing".to_owned(),
            stage: AwarenessStage::ProblemAware,
            demographics: None,
            psychographics: None,
            buyer_psychology: None,
            extra: Default::default(),
        }
    }

    fn quick() -> RetryPolicy {
        RetryPolicy::fixed(2, Duration::from_millis(1))
    }

    #[test]
    fn unanswered_lists_missing_required_ids() -> anyhow::Result<()> {
        let mut store = ResearchStore::in_memory();
        set_answer(&mut store, "offer", "A book")?;
        set_answer(&mut store, "audience", "   ")?;
        let missing = unanswered(store.session());
        assert_eq!(missing.len(), 5);
        assert!(!missing.contains(&"offer".to_owned()));
        assert!(set_answer(&mut store, "favourite_colour", "blue").is_err());
        Ok(())
    }

    #[tokio::test]
    async fn avatar_requires_questionnaire() {
        let mut store = ResearchStore::in_memory();
        let backend = ScriptedBackend::default();
        let err = generate_avatar(&mut store, &backend, quick()).await;
        assert!(err.is_err());
        assert_eq!(backend.calls(wire::GENERATE_AVATAR), 0);
    }

    #[tokio::test]
    async fn avatar_succeeds_on_third_attempt() -> anyhow::Result<()> {
        let mut store = answered()?;
        let backend = ScriptedBackend::default();
        backend
            .avatar
            .err(server_error(wire::GENERATE_AVATAR))
            .err(server_error(wire::GENERATE_AVATAR))
            .ok(GeneratedAvatar {
                avatar: avatar(),
                warning: None,
            });

        generate_avatar(&mut store, &backend, quick()).await?;
        assert_eq!(backend.calls(wire::GENERATE_AVATAR), 3);
        assert_eq!(
            store.session().problem_aware().map(|a| a.name.as_str()),
            Some("Maria")
        );

        let sent = backend.requests(wire::GENERATE_AVATAR);
        assert_eq!(sent[0]["stage"], "problem_aware");
        let prompt = sent[0]["prompt"].as_str().unwrap_or_default();
        assert!(!prompt.contains("[OFFER]"));
        Ok(())
    }

    #[tokio::test]
    async fn avatar_gives_up_after_three_attempts() -> anyhow::Result<()> {
        let mut store = answered()?;
        let backend = ScriptedBackend::default();
        for _ in 0..4 {
            backend.avatar.err(server_error(wire::GENERATE_AVATAR));
        }
        assert!(generate_avatar(&mut store, &backend, quick()).await.is_err());
        assert_eq!(backend.calls(wire::GENERATE_AVATAR), 3);
        assert!(store.session().problem_aware().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn avatar_retries_client_errors_too() -> anyhow::Result<()> {
        let mut store = answered()?;
        let backend = ScriptedBackend::default();
        for _ in 0..3 {
            backend.avatar.err(BackendError::Status {
                endpoint: wire::GENERATE_AVATAR.to_owned(),
                status: 429,
                message: "slow down".to_owned(),
            });
        }
        assert!(generate_avatar(&mut store, &backend, quick()).await.is_err());
        assert_eq!(backend.calls(wire::GENERATE_AVATAR), 3);
        Ok(())
    }

    #[tokio::test]
    async fn diary_keeps_partial_entries() -> anyhow::Result<()> {
        let mut store = answered()?;
        store.update(|s| {
            s.avatars.insert(AwarenessStage::ProblemAware, avatar());
        })?;
        let backend = ScriptedBackend::default();
        backend
            .diary
            .ok("Dear diary, before".to_owned())
            .err(server_error(wire::GENERATE_DIARY))
            .ok("Dear diary, after".to_owned());

        let outcome = generate_diary(&mut store, &backend, RetryPolicy::none()).await?;
        assert_eq!(outcome.failed, vec![DiaryPhase::During]);
        assert_eq!(outcome.entries.before, "Dear diary, before");
        assert!(outcome.entries.during.is_empty());

        let types: Vec<String> = backend
            .requests(wire::GENERATE_DIARY)
            .iter()
            .map(|r| r["diary_type"].as_str().unwrap_or_default().to_owned())
            .collect();
        assert_eq!(types, vec!["before", "during", "after"]);
        assert!(store.session().diary.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn later_steps_are_gated() -> anyhow::Result<()> {
        let mut store = answered()?;
        let backend = ScriptedBackend::default();
        let err = generate_brand(&mut store, &backend, RetryPolicy::none())
            .await
            .err()
            .ok_or_else(|| anyhow::anyhow!("brand should be gated"))?;
        assert!(err.to_string().contains("Problem-Aware avatar"));

        store.update(|s| {
            s.avatars.insert(AwarenessStage::ProblemAware, avatar());
        })?;
        let err = generate_marketing(&mut store, &backend, RetryPolicy::none())
            .await
            .err()
            .ok_or_else(|| anyhow::anyhow!("marketing should be gated"))?;
        assert!(err.to_string().contains("brand identity"));
        assert_eq!(backend.calls(wire::GENERATE_MARKETING), 0);
        Ok(())
    }

    #[tokio::test]
    async fn brand_then_landing_page() -> anyhow::Result<()> {
        let mut store = answered()?;
        store.update(|s| {
            s.avatars.insert(AwarenessStage::ProblemAware, avatar());
        })?;
        let backend = ScriptedBackend::default();
        backend.brand.ok("# Brand".to_owned());
        backend.landing.ok("# Landing".to_owned());

        generate_brand(&mut store, &backend, RetryPolicy::none()).await?;
        generate_landing_page(&mut store, &backend, RetryPolicy::none()).await?;
        assert_eq!(store.session().brand_identity.as_deref(), Some("# Brand"));
        assert_eq!(store.session().landing_page_spec.as_deref(), Some("# Landing"));
        assert_eq!(
            backend.requests(wire::GENERATE_LANDING_PAGE)[0]["brand_identity"],
            "# Brand"
        );
        Ok(())
    }

    #[test]
    fn reset_keeps_answers_by_default() -> anyhow::Result<()> {
        let mut store = answered()?;
        store.update(|s| s.brand_identity = Some("x".to_owned()))?;
        reset(&mut store, false)?;
        assert!(store.session().brand_identity.is_none());
        assert!(unanswered(store.session()).is_empty());
        reset(&mut store, true)?;
        assert_eq!(unanswered(store.session()).len(), OFFER_QUESTIONS.len());
        Ok(())
    }
}
