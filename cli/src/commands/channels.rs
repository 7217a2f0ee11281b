use tether::ChannelKind;
use tether::channel::catalogue;

pub fn execute() {
    for info in catalogue() {
        let kind = match info.kind() {
            ChannelKind::OneWay => "one-way",
            ChannelKind::TwoWay => "two-way",
            ChannelKind::Blocking => "blocking",
        };
        println!("{kind:8} {}", info.name());
    }
}
