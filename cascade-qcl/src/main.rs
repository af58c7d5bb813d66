use cascade_qcl::app::run;

fn main() -> color_eyre::Result<()> {
    run()
}
