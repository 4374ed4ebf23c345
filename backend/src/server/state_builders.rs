//! Builders wiring adapters into domain services and HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use backend::domain::ports::{
    DelegationStatsCache, PostRepository, RefreshTokenLedger, UserRepository,
};
use backend::domain::{
    AuthGateService, DelegationStatsService, PostService, UserOnboardingService,
    UserProfileService,
};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::outbound::cache::{InMemoryDelegationStatsCache, RedisDelegationStatsCache};
use backend::outbound::memory::{InMemoryPostRepository, InMemoryUserRepository};
use backend::outbound::onchain::HttpDelegationStatsSource;
use backend::outbound::persistence::{DieselPostRepository, DieselUserRepository};
use backend::outbound::tokens::{
    InMemoryRefreshTokenLedger, JwtTokenCodec, RedisRefreshTokenLedger, TokenTtls,
};

use super::ServerConfig;

/// Driven adapters selected for this process.
struct Stores {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    stats_cache: Arc<dyn DelegationStatsCache>,
    ledger: Arc<dyn RefreshTokenLedger>,
}

fn select_stores(config: &ServerConfig) -> Stores {
    let (users, posts): (Arc<dyn UserRepository>, Arc<dyn PostRepository>) =
        match &config.db_pool {
            Some(pool) => (
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselPostRepository::new(pool.clone())),
            ),
            None => {
                info!("no database configured; users and posts are held in memory");
                (
                    Arc::new(InMemoryUserRepository::new()),
                    Arc::new(InMemoryPostRepository::new()),
                )
            }
        };
    let ttl = config.delegation.cache_ttl;
    let (stats_cache, ledger): (Arc<dyn DelegationStatsCache>, Arc<dyn RefreshTokenLedger>) =
        match &config.redis_pool {
            Some(pool) => (
                Arc::new(RedisDelegationStatsCache::new(pool.clone(), ttl)),
                Arc::new(RedisRefreshTokenLedger::new(pool.clone())),
            ),
            None => {
                info!("no redis configured; stats cache and refresh ledger are process-local");
                (
                    Arc::new(InMemoryDelegationStatsCache::new(ttl)),
                    Arc::new(InMemoryRefreshTokenLedger::new()),
                )
            }
        };
    Stores {
        users,
        posts,
        stats_cache,
        ledger,
    }
}

/// Build the HTTP state from the selected adapters.
///
/// # Errors
/// Returns [`std::io::Error`] when the indexer HTTP client cannot be built.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let Stores {
        users,
        posts,
        stats_cache,
        ledger,
    } = select_stores(config);

    let codec = Arc::new(JwtTokenCodec::new(
        &config.tokens.secret,
        TokenTtls {
            access: config.tokens.access_ttl,
            refresh: config.tokens.refresh_ttl,
        },
    ));
    let gate = Arc::new(AuthGateService::new(codec, ledger, Arc::new(DefaultClock)));

    let source = HttpDelegationStatsSource::new(
        config.delegation.endpoints.clone(),
        config.delegation.timeout,
    )
    .map_err(|err| std::io::Error::other(format!("indexer client construction failed: {err}")))?;
    let delegation = Arc::new(DelegationStatsService::new(
        stats_cache,
        Arc::new(source),
        config.delegation.enabled,
    ));

    let post_service = Arc::new(PostService::new(posts, config.search.clone()));

    let ports = HttpStatePorts {
        gate,
        profile: Arc::new(UserProfileService::new(users.clone())),
        delegation,
        posts: post_service.clone(),
        posts_command: post_service,
        identity: Arc::new(UserOnboardingService::new(users)),
    };
    Ok(web::Data::new(HttpState::new(
        ports,
        config.cookie_policy(),
        config.default_network,
    )))
}
