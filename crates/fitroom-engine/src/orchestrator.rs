use std::thread;

use fitroom_contracts::errors::GenerationError;
use fitroom_contracts::studio::GenerationRequest;

use crate::service::TryOnService;

/// Runs every request of a batch on its own scoped thread and joins them all.
///
/// Results come back in request order. If any request fails the whole batch
/// fails with the error of the lowest-index failure; siblings still run to
/// completion and their images are dropped.
pub fn run_variations(
    service: &dyn TryOnService,
    requests: &[GenerationRequest],
) -> Result<Vec<String>, GenerationError> {
    let outcomes: Vec<Result<String, GenerationError>> = thread::scope(|scope| {
        let handles: Vec<_> = requests
            .iter()
            .map(|request| scope.spawn(move || service.generate_try_on(request)))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle.join().unwrap_or_else(|_| {
                    Err(GenerationError::Transport(
                        "variation worker panicked".to_string(),
                    ))
                })
            })
            .collect()
    });

    let mut images = Vec::with_capacity(outcomes.len());
    for (idx, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(image) => images.push(image),
            Err(err) => {
                tracing::warn!(variation = idx + 1, error = %err, "variation failed, discarding batch");
                return Err(err);
            }
        }
    }
    Ok(images)
}
