//! `ExceptionAggregator`: slot único con el error lanzado más recientemente.
//!
//! Cada fallo (pre-hook, body, post-hook) sobrescribe el slot en el orden
//! cronológico real de ejecución; sólo el valor final se propaga. El historial
//! completo se conserva para auditoría.

use crate::errors::FunctionError;
use crate::event::ErrorSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedError {
    pub source: ErrorSource,
    pub error: FunctionError,
}

#[derive(Debug, Default)]
pub struct ExceptionAggregator {
    history: Vec<RecordedError>,
}

impl ExceptionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un error; pasa a ser el "último error" sin condiciones.
    pub fn record(&mut self, source: ErrorSource, error: FunctionError) {
        self.history.push(RecordedError { source, error });
    }

    /// Error vigente (el más reciente).
    pub fn last(&self) -> Option<&RecordedError> {
        self.history.last()
    }

    /// Errores reemplazados por uno posterior.
    pub fn superseded(&self) -> &[RecordedError] {
        match self.history.len() {
            0 => &[],
            n => &self.history[..n - 1],
        }
    }

    pub fn history(&self) -> &[RecordedError] {
        &self.history
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Consume el agregador devolviendo el error ganador.
    pub fn into_last(mut self) -> Option<RecordedError> {
        self.history.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FilterPhase;
    use crate::filter::FilterScope;

    #[test]
    fn latest_error_wins_regardless_of_phase() {
        let mut agg = ExceptionAggregator::new();
        agg.record(ErrorSource::Body, FunctionError::body("body"));
        agg.record(ErrorSource::Filter { index: 1,
                                         scope: FilterScope::Unit,
                                         name: "U1".into(),
                                         phase: FilterPhase::After },
                   FunctionError::filter("U1", FilterPhase::After, "post"));
        assert_eq!(agg.superseded().len(), 1);
        assert_eq!(agg.superseded()[0].error, FunctionError::body("body"));
        let last = agg.into_last().expect("an error");
        assert_eq!(last.error, FunctionError::filter("U1", FilterPhase::After, "post"));
    }

    #[test]
    fn empty_aggregator_surfaces_nothing() {
        let agg = ExceptionAggregator::new();
        assert!(agg.last().is_none());
        assert!(agg.superseded().is_empty());
    }
}
