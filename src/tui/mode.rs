// state local to the tui, synced from DisplayState once per frame so the
// input layer knows how to route keys (the open form captures the keyboard)
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub form_open: bool,
}
