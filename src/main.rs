fn main() {
    corvus::uci::run_uci_loop();
}
