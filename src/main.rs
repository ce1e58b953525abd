fn main() -> anyhow::Result<()> {
    imagegen_relay_lib::run()
}
