use super::cache::{CacheKey, DualCache};
use super::forwarding::{MessageBuilder, QuestionNormalizer};
use super::load_balancer::UpstreamRacer;
use futures::future::{BoxFuture, FutureExt, Shared};
use hickory_proto::op::{Message, ResponseCode};
use localdns_application::ports::AdminTriggers;
use localdns_domain::{DomainError, Protocol, ProxySettings, Question};
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

/// Positive answers are whole upstream replies; negative entries keep the
/// response code that produced them.
pub type ProxyCache = DualCache<Arc<Message>, ResponseCode>;

/// Upstream reply shared by every caller waiting on the same question.
#[derive(Clone)]
enum Outcome {
    Reply(Arc<Message>),
    Failed,
}

type Resolution = Shared<BoxFuture<'static, Outcome>>;
type InFlight = Mutex<FxHashMap<CacheKey, Resolution>>;

/// Caching forwarder in front of the upstream racer.
///
/// Concurrent misses on one question share a single race; the race writes
/// the cache and leaves the in-flight table before any waiter sees it.
pub struct DnsProxy {
    racer: Arc<UpstreamRacer>,
    cache: Arc<ProxyCache>,
    in_flight: Arc<InFlight>,
    passthrough_unsupported: bool,
    echo_negative_rcode: bool,
}

impl DnsProxy {
    /// Proxy with the negative expiration at half of `expire` and the
    /// default stagger.
    pub fn new<S: AsRef<str>>(
        addrs: &[S],
        timeout: Duration,
        expire: Duration,
        cache_size: usize,
    ) -> Result<Self, DomainError> {
        let settings = ProxySettings::new(addrs, timeout, expire, cache_size)?;
        Self::from_settings(&settings)
    }

    pub fn from_settings(settings: &ProxySettings) -> Result<Self, DomainError> {
        settings.validate()?;

        let racer = UpstreamRacer::new(
            settings.nameservers.clone(),
            settings.timeout,
            settings.stagger,
        )?;

        info!(
            nameservers = settings.nameservers.len(),
            timeout_ms = settings.timeout.as_millis() as u64,
            expire_secs = settings.expire.as_secs(),
            negative_expire_secs = settings.negative_expire.as_secs(),
            cache_size = settings.cache_size.get(),
            "Proxy initialized"
        );

        Ok(Self {
            racer: Arc::new(racer),
            cache: Arc::new(DualCache::new(
                settings.cache_size,
                settings.expire,
                settings.negative_expire,
            )),
            in_flight: Arc::new(Mutex::new(FxHashMap::default())),
            passthrough_unsupported: settings.passthrough_unsupported,
            echo_negative_rcode: settings.echo_negative_rcode,
        })
    }

    pub fn cache(&self) -> &ProxyCache {
        &self.cache
    }

    /// Answer `request`, from cache when possible. Never fails: every error
    /// path turns into a SERVFAIL reply.
    pub async fn handle(&self, request: &Message, protocol: Protocol) -> Message {
        let question = match QuestionNormalizer::normalize(request) {
            Ok(question) => question,
            Err(e) => {
                debug!(error = %e, id = request.id(), "Query not cacheable");
                if self.passthrough_unsupported {
                    return self.passthrough(request, protocol).await;
                }
                return MessageBuilder::server_failure(request);
            }
        };

        let key = CacheKey::for_question(&question);

        if let Some(cached) = self.cache.get_positive(&key) {
            debug!(question = %question, key = %key, "Positive cache hit");
            return restamp(&cached, request);
        }

        if let Some(rcode) = self.cache.get_negative(&key) {
            debug!(question = %question, key = %key, rcode = ?rcode, "Negative cache hit");
            let rcode = if self.echo_negative_rcode {
                rcode
            } else {
                ResponseCode::ServFail
            };
            return MessageBuilder::reply_with_rcode(request, rcode);
        }

        match self.resolution(key, question, request, protocol).await {
            Outcome::Reply(message) => restamp(&message, request),
            Outcome::Failed => MessageBuilder::server_failure(request),
        }
    }

    /// The pending race for `key`, started on behalf of `request` when no
    /// other caller is already waiting on one.
    fn resolution(
        &self,
        key: CacheKey,
        question: Question,
        request: &Message,
        protocol: Protocol,
    ) -> Resolution {
        let mut in_flight = lock(&self.in_flight);
        if let Some(pending) = in_flight.get(&key) {
            debug!(question = %question, key = %key, "Joining in-flight resolution");
            return pending.clone();
        }

        let racer = Arc::clone(&self.racer);
        let cache = Arc::clone(&self.cache);
        let registry = Arc::clone(&self.in_flight);
        let request = request.clone();

        let pending = async move {
            let outcome = match racer.race(&request, protocol).await {
                Ok(result) => {
                    let message = Arc::new(result.message);
                    if message.answers().is_empty() {
                        debug!(
                            question = %question,
                            server = %result.server,
                            rcode = ?message.response_code(),
                            "Upstream answer without records, caching negative"
                        );
                        cache.set_negative(key, message.response_code());
                    } else {
                        debug!(
                            question = %question,
                            server = %result.server,
                            answers = message.answers().len(),
                            latency_ms = result.latency_ms,
                            "Upstream answer cached"
                        );
                        cache.set_positive(key, Arc::clone(&message));
                    }
                    Outcome::Reply(message)
                }
                Err(e) => {
                    info!(question = %question, error = %e, "Resolution failed");
                    cache.set_negative(key, ResponseCode::ServFail);
                    Outcome::Failed
                }
            };
            lock(&registry).remove(&key);
            outcome
        }
        .boxed()
        .shared();

        in_flight.insert(key, pending.clone());
        pending
    }

    /// Forward as-is, no cache access.
    async fn passthrough(&self, request: &Message, protocol: Protocol) -> Message {
        match self.racer.race(request, protocol).await {
            Ok(result) => result.message,
            Err(e) => {
                info!(error = %e, id = request.id(), "Passthrough failed");
                MessageBuilder::server_failure(request)
            }
        }
    }
}

/// `reply` as an answer to `request`: its transaction id and its question
/// section, letter case included.
fn restamp(reply: &Message, request: &Message) -> Message {
    let mut reply = reply.clone();
    reply.set_id(request.id());
    reply.take_queries();
    reply.add_queries(request.queries().to_vec());
    reply
}

fn lock(in_flight: &InFlight) -> MutexGuard<'_, FxHashMap<CacheKey, Resolution>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AdminTriggers for DnsProxy {
    fn flush(&self) {
        self.cache.purge();
        info!("Cache was cleared");
    }

    fn dump_stats(&self) {
        let positive = self.cache.positive_stats();
        info!(
            hits = positive.hits,
            misses = positive.misses,
            lookups = positive.lookups,
            hit_rate = %format!("{:.2}%", positive.hit_rate * 100.0),
            entries = self.cache.positive_len(),
            "Cache stats"
        );

        let negative = self.cache.negative_stats();
        debug!(
            hits = negative.hits,
            misses = negative.misses,
            lookups = negative.lookups,
            entries = self.cache.negative_len(),
            "Negative cache stats"
        );
    }
}
