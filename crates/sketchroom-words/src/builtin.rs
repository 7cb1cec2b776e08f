//! Built-in word lists.

pub(crate) const ANIMALS: &[&str] = &[
    "Ants", "Flea", "Spider", "Worm", "Grasshopper", "Mantis", "Dragonfly", "Wasp", "Caterpillar",
    "Ladybug", "Beetle", "Butterfly", "Moth", "Lice", "Cockroach", "Cricket", "Earwig", "Mayfly",
    "Termite", "Stickbug", "Stinkbug", "Scorpion", "Lacewing", "Isopod", "Springtail", "Mosquito",
    "Centipede", "Squirrel", "Dog", "Pig", "Lion", "Mouse", "Monkey", "Elephant", "Kangaroo",
    "Leopard", "Coyote", "Hedgehog", "Chimpanzee", "Walrus", "Goat", "Koala", "Hippo", "Sheep",
    "Raccoon", "Ox", "Otter", "Horse", "Mole", "Giraffe", "Deer", "Cat", "Human", "Dolphin",
    "Whale", "Sloth", "Seal", "Rabbit", "Wolf", "Tiger", "Meerkat", "Guinea pig", "Bear", "Panda",
    "Lemur", "Skunk", "Bat", "Gorilla", "Beaver", "Polar Bear", "Platypus", "Cheetah", "Gazelle",
    "Elk", "Racoon", "Drop bear", "Camel", "Rhino", "Bison", "Zebra", "Alligator", "snake",
    "Chameleon", "Bearded Dragon", "Komodo dragon", "Coral snake", "Fire Salamander", "Turtle",
    "Gecko", "Gila monster", "Iguana", "Frilled Lizard", "Dragon", "Blue Tongue Skink", "Cobra",
    "Rattlesnake", "Thorny Dragon", "Eagle", "Hawk", "Parrot", "Goldfinch", "Magpie", "Chicken",
    "Penguin", "ostrich", "Emu", "Pelican", "Sparrow", "Swan", "Stork", "Raven", "Turkey", "Pigeon",
    "Vulture", "Albatross", "Condors", "Pheasant", "Starling", "Woodpecker", "Crow", "Cockatoo",
    "Peacock", "Cockatiels", "Canaries", "Dove", "Flamingo", "Toucan", "Horned Owl", "Chick",
    "Goose", "Duck", "Hummingbird", "Mockingbird", "Kiwi", "Bald Eagle", "Donald Duck", "Rooster",
    "Crane", "Kingfisher",
];

pub(crate) const SPORTS: &[&str] = &[
    "Conor McGregor", "Lionel Messi", "Cristiano Ronaldo", "LeBron James", "Neymar",
    "Lewis Hamilton", "Tom Brady", "Kevin Durant", "Naomi Osaka", "Tiger Woods", "Michael Jordan",
    "Serena Williams", "Muhammad Ali", "Wladimir Klitschko", "Michael Schumacher", "The Rock",
    "Arnold Schwarzenegger", "Terry Crews", "Ronaldinho", "Shaquille O Neal", "Usain Bolt",
    "Michael Phelps", "Maradona", "Roger Federer", "Pele", "Manny Pacquiao", "David Beckham",
    "Lance Armstrong", "Babe Ruth", "Anthony Joshua", "Jon Jones", "Georges St.Pierre",
    "Anderson Silva", "Khabib Nurmagomedov", "Amanda Nunes", "Mike Tyson", "Sonny Liston",
    "George Foreman", "Joe Frazier", "Larry Holmes", "Floyd Mayweather", "Evander Holyfield",
    "Kobe Bryant", "Max Verstappen", "Ronda Rousey", "Basketball", "Tennis", "Baseball", "Golf",
    "Running", "Volleyball", "Badminton", "Swimming", "Boxing", "ping pong", "Skiing",
    "Ice skating", "Roller skating", "Cricket", "Rugby", "Pool", "Darts", "Football", "Bowling",
    "Ice hockey", "Surfing", "Karate", "Horse racing", "Snowboarding", "Skateboarding", "Cycling",
    "Archery", "Fishing", "Gymnastics", "Figure skating", "Rock climbing", "Sumo wrestling",
    "Taekwondo", "Fencing", "Water skiing", "Jet skiing", "Weight lifting", "Scuba diving", "Judo",
    "Wind surfing", "Kickboxing", "Sky diving", "Hang gliding", "Bungee jumping", "Soccer",
    "Street hokey", "Extreme Ironing", "Chess", "e-sports",
];

pub(crate) const RANDOM: &[&str] = &[
    "stow", "bulldog", "partner", "palace", "snooze", "accounting", "yawn", "ditch", "fortress",
    "factory", "speakers", "prize", "propose", "mat", "clique", "foam", "cure", "trombone",
    "toolbox", "weather", "double", "vehicle", "chain mail", "rib", "avocado", "mold", "dent",
    "tow truck", "photosynthesis", "torch", "yard", "nap", "letter opener", "devious", "connection",
    "taxi", "world", "tiptoe", "irrigation", "customer", "cousin", "water buffalo", "edit",
    "coastline", "scuba diving", "rodeo", "dew", "lie", "nanny", "organ", "putty", "mysterious",
    "sweater vest", "parent", "garden hose", "Quidditch", "flu", "blush", "sushi", "chime",
    "chariot racing", "snore", "conveyor belt", "pest", "bargain", "lace", "jazz", "beluga whale",
    "robe", "stationery", "jeans", "wedding cake", "koala", "prey", "plumber", "sash",
    "cell phone charger", "cable car", "full", "bookend", "carat", "lipstick", "ream", "haircut",
    "lunch tray", "cough", "record", "stopwatch", "script", "lecture", "cliff", "dream", "glue gun",
    "baseboards", "shower curtain", "hipster", "judge", "crate", "professor", "boa constrictor",
    "centimeter", "living room", "vein", "fade", "barbershop", "dawn", "juggle", "cream",
    "password", "gallon", "seat", "raft", "husband", "electrical outlet", "mayor", "baguette",
    "student", "somersault", "puppet", "distance", "time", "elf", "downpour", "honk", "company",
    "runoff", "printer ink", "macho", "hang glider", "cruise", "parade", "beanstalk", "quit",
    "pile", "trapped", "season", "dorsal", "mime", "coil", "cruise ship", "blizzard",
    "roller coaster", "groom", "shrew", "sweater", "mine", "reveal", "skating rink", "economics",
    "learn", "yardstick", "fireman pole", "migrate", "cleaning spray", "eraser", "kneel",
    "crop duster", "vet", "steam", "pawn", "hoop", "drawback", "acrobat", "Heinz 57",
    "extension cord", "darts", "son-in-law", "half", "country", "laser", "lung", "earache",
    "shelter", "handle", "chisel", "front", "inning", "vision", "promise", "trademark",
    "feeder road", "emperor", "aftermath", "bushel", "wish", "lichen", "addendum", "fragment",
    "opaque", "infection", "income", "guess", "doppelganger", "tug", "water vapor", "villain",
    "cramp", "inquisition", "intern", "education", "implode", "junk drawer", "try", "climate",
    "brainstorm", "flutter", "pomp", "population", "acoustics", "flotsam", "haberdashery",
    "statement", "gymnast", "opinion", "ice fishing", "steel drum", "sophomore", "irrational",
    "preteen", "ray", "depth", "consent", "eureka", "altitude", "crow's nest", "important", "drip",
    "cockpit", "videogame", "chess", "think", "attack", "diver", "apathetic", "post office",
    "spare", "testify", "toddler", "clamp", "coach", "hot tub", "tank", "obey", "shack", "vanish",
    "calm", "level", "tugboat", "yak", "interception", "drain", "commercial", "grandpa", "plank",
    "freshman", "jungle", "story", "passenger", "bedbug", "stage fright", "shampoo", "ginger",
    "drought",
];

pub(crate) const CATEGORIES: &[(&str, &[&str])] = &[
    ("Animals", ANIMALS),
    ("Sports", SPORTS),
    ("Random", RANDOM),
];
